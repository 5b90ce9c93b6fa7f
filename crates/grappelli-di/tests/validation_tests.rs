//! Whole-graph validation tests

use grappelli_di::{
	Dependency, DependencyMap, DiError, ObjectGraph, Spec, to_object,
};
use rstest::*;
use std::collections::HashSet;

fn factory_with_deps(graph: &ObjectGraph, name: &'static str, deps: &[&'static str]) {
	let mut dependencies = DependencyMap::new();
	for dep in deps {
		dependencies = dependencies.with_position(Spec::name(*dep));
	}
	graph
		.register_factory(Spec::name(name), dependencies, None, |_args| {
			Ok(to_object(()))
		})
		.unwrap();
}

#[rstest]
fn valid_acyclic_graph_passes() {
	// Arrange
	let graph = ObjectGraph::new();
	graph.register_instance(Spec::name("leaf"), 0i32);
	factory_with_deps(&graph, "middle", &["leaf"]);
	factory_with_deps(&graph, "root", &["middle", "leaf"]);

	// Act & Assert
	graph.validate().unwrap();
}

#[rstest]
fn missing_dependency_is_reported_with_both_sides() {
	// Arrange
	let graph = ObjectGraph::new();
	factory_with_deps(&graph, "service", &["db"]);

	// Act
	let err = graph.validate().unwrap_err();

	// Assert
	match err {
		DiError::MissingDependency {
			dependant,
			dependency,
		} => {
			assert_eq!(dependant, Spec::name("service"));
			assert_eq!(dependency, Spec::name("db"));
		}
		other => panic!("expected MissingDependency, got {other}"),
	}
}

#[rstest]
fn registering_the_missing_provider_fixes_validation() {
	// Arrange
	let graph = ObjectGraph::new();
	factory_with_deps(&graph, "service", &["db"]);
	assert!(graph.validate().is_err());

	// Act
	graph.register_instance(Spec::name("db"), "connected");

	// Assert
	graph.validate().unwrap();
}

#[rstest]
fn self_dependency_is_rejected() {
	// Arrange
	let graph = ObjectGraph::new();
	factory_with_deps(&graph, "narcissist", &["narcissist"]);

	// Act
	let err = graph.validate().unwrap_err();

	// Assert
	assert!(matches!(err, DiError::SelfDependency(spec) if spec == Spec::name("narcissist")));
}

#[rstest]
fn dependency_cycle_reports_exactly_the_participants() {
	// Arrange: a -> b -> c -> a, with an innocent bystander hanging off b.
	let graph = ObjectGraph::new();
	factory_with_deps(&graph, "a", &["b"]);
	factory_with_deps(&graph, "b", &["c", "bystander"]);
	factory_with_deps(&graph, "c", &["a"]);
	graph.register_instance(Spec::name("bystander"), 0i32);

	// Act
	let err = graph.validate().unwrap_err();

	// Assert
	let cycle = match err {
		DiError::DependencyCycle(cycle) => cycle,
		other => panic!("expected DependencyCycle, got {other}"),
	};
	let members: HashSet<&Spec> = cycle.specifications().iter().collect();
	let expected: [Spec; 3] = [Spec::name("a"), Spec::name("b"), Spec::name("c")];
	assert_eq!(members, expected.iter().collect());
}

#[rstest]
fn cycle_order_respects_adjacency() {
	// Arrange
	let graph = ObjectGraph::new();
	factory_with_deps(&graph, "a", &["b"]);
	factory_with_deps(&graph, "b", &["c"]);
	factory_with_deps(&graph, "c", &["a"]);

	let depends_on = |dependant: &Spec, dependency: &Spec| -> bool {
		let pairs = [
			(Spec::name("a"), Spec::name("b")),
			(Spec::name("b"), Spec::name("c")),
			(Spec::name("c"), Spec::name("a")),
		];
		pairs
			.iter()
			.any(|(from, to)| from == dependant && to == dependency)
	};

	// Act
	let err = graph.validate().unwrap_err();

	// Assert: each element depends on the previous one, the first on the last.
	let cycle = match err {
		DiError::DependencyCycle(cycle) => cycle,
		other => panic!("expected DependencyCycle, got {other}"),
	};
	let specs = cycle.specifications();
	for window in specs.windows(2) {
		assert!(depends_on(&window[1], &window[0]));
	}
	assert!(depends_on(&specs[0], &specs[specs.len() - 1]));
}

#[rstest]
fn factory_dependencies_still_count_as_cycle_edges() {
	// Arrange: the deferred edge would only loop at call time, but the
	// declared structure is still circular.
	let graph = ObjectGraph::new();
	graph
		.register_factory(
			Spec::name("a"),
			DependencyMap::new().with_position(Dependency::factory(Spec::name("b"))),
			None,
			|_args| Ok(to_object(())),
		)
		.unwrap();
	graph
		.register_factory(
			Spec::name("b"),
			DependencyMap::new().with_position(Spec::name("a")),
			None,
			|_args| Ok(to_object(())),
		)
		.unwrap();

	// Act
	let err = graph.validate().unwrap_err();

	// Assert
	assert!(matches!(err, DiError::DependencyCycle(_)));
}

#[rstest]
fn factory_dependency_on_a_missing_specification_is_reported() {
	// Arrange
	let graph = ObjectGraph::new();
	graph
		.register_factory(
			Spec::name("service"),
			DependencyMap::new().with_position(Dependency::factory(Spec::name("ghost"))),
			None,
			|_args| Ok(to_object(())),
		)
		.unwrap();

	// Act
	let err = graph.validate().unwrap_err();

	// Assert
	assert!(matches!(err, DiError::MissingDependency { .. }));
}

#[rstest]
fn validation_does_not_invoke_providers() {
	// Arrange
	let graph = ObjectGraph::new();
	graph
		.register_factory(Spec::name("explosive"), DependencyMap::new(), None, |_args| {
			panic!("validation must not invoke providers")
		})
		.unwrap();

	// Act & Assert
	graph.validate().unwrap();
}
