//! Deferred factory handle tests

use grappelli_di::{
	Arguments, BoundFunction, Dependency, DependencyMap, DiError, FactoryHandle, ObjectGraph,
	ScopeTag, Spec, to_object,
};
use rstest::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[rstest]
fn factory_handle_resolves_lazily_on_each_call() {
	// Arrange
	let graph = ObjectGraph::new();
	let counter = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&counter);
	graph
		.register_factory(Spec::name("ticket"), DependencyMap::new(), None, move |_args| {
			Ok(to_object(seen.fetch_add(1, Ordering::SeqCst) + 1))
		})
		.unwrap();
	graph
		.register_factory(
			Spec::name("dispenser"),
			DependencyMap::new().with_position(Dependency::factory(Spec::name("ticket"))),
			None,
			|args| Ok(Arc::clone(args.get(0).unwrap())),
		)
		.unwrap();

	// Act
	let dispenser = graph
		.get_as::<FactoryHandle>(&Spec::name("dispenser"))
		.unwrap();
	assert_eq!(counter.load(Ordering::SeqCst), 0);
	let tickets: Vec<usize> = (0..3)
		.map(|_| *dispenser.call_as::<usize>().unwrap())
		.collect();

	// Assert: unscoped target, fresh instance each call.
	assert_eq!(tickets, vec![1, 2, 3]);
}

#[rstest]
fn factory_handle_honors_the_target_scope() {
	// Arrange
	let graph = ObjectGraph::new();
	let counter = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&counter);
	graph
		.register_factory(
			Spec::name("ticket"),
			DependencyMap::new(),
			Some(&ScopeTag::SINGLETON),
			move |_args| Ok(to_object(seen.fetch_add(1, Ordering::SeqCst) + 1)),
		)
		.unwrap();
	graph
		.register_factory(
			Spec::name("dispenser"),
			DependencyMap::new().with_position(Dependency::factory(Spec::name("ticket"))),
			None,
			|args| Ok(Arc::clone(args.get(0).unwrap())),
		)
		.unwrap();

	// Act
	let dispenser = graph
		.get_as::<FactoryHandle>(&Spec::name("dispenser"))
		.unwrap();
	let tickets: Vec<usize> = (0..3)
		.map(|_| *dispenser.call_as::<usize>().unwrap())
		.collect();

	// Assert: every call hits the singleton cache.
	assert_eq!(tickets, vec![1, 1, 1]);
}

#[rstest]
fn factory_handle_forwards_call_arguments_as_overrides() {
	// Arrange
	let graph = ObjectGraph::new();
	graph.register_instance(Spec::name("base"), 1i32);
	graph
		.register_factory(
			Spec::name("value"),
			DependencyMap::new().with_position(Spec::name("base")),
			None,
			|args| Ok(to_object(*args.positional_as::<i32>(0)?)),
		)
		.unwrap();
	graph
		.register_factory(
			Spec::name("maker"),
			DependencyMap::new().with_position(Dependency::factory(Spec::name("value"))),
			None,
			|args| Ok(Arc::clone(args.get(0).unwrap())),
		)
		.unwrap();
	let maker = graph.get_as::<FactoryHandle>(&Spec::name("maker")).unwrap();

	// Act
	let injected = maker.call0().unwrap();
	let overridden = maker
		.call(Arguments::new().with_positional(to_object(7i32)))
		.unwrap();

	// Assert
	assert_eq!(*injected.downcast::<i32>().unwrap(), 1);
	assert_eq!(*overridden.downcast::<i32>().unwrap(), 7);
}

#[rstest]
fn factory_handle_fails_once_the_graph_is_released() {
	// Arrange
	let graph = ObjectGraph::new();
	graph.register_instance(Spec::name("value"), 1i32);
	graph
		.register_factory(
			Spec::name("maker"),
			DependencyMap::new().with_position(Dependency::factory(Spec::name("value"))),
			None,
			|args| Ok(Arc::clone(args.get(0).unwrap())),
		)
		.unwrap();
	let maker = graph.get_as::<FactoryHandle>(&Spec::name("maker")).unwrap();
	assert!(maker.call0().is_ok());

	// Act
	drop(graph);
	let err = maker.call0().unwrap_err();

	// Assert
	assert!(matches!(err, DiError::GraphReleased(spec) if spec == Spec::name("value")));
}

#[rstest]
fn function_provider_yields_a_bound_function() {
	// Arrange
	let graph = ObjectGraph::new();
	graph.register_instance(Spec::name("greeting"), "hello");
	graph
		.register_function(
			Spec::name("greet"),
			DependencyMap::new().with_position(Spec::name("greeting")),
			None,
			|args| {
				let greeting = *args.positional_as::<&str>(0)?;
				let name = *args.positional_as::<&str>(1)?;
				Ok(to_object(format!("{greeting}, {name}")))
			},
		)
		.unwrap();

	// Act
	let greet = graph
		.get_as::<BoundFunction>(&Spec::name("greet"))
		.unwrap();
	assert_eq!(greet.injected().positional().len(), 1);
	let message = greet
		.call(
			Arguments::new()
				.with_positional(to_object("hi"))
				.with_positional(to_object("grappelli")),
		)
		.unwrap();

	// Assert: call slot 0 replaced the injected greeting, slot 1 extended.
	assert_eq!(*message.downcast::<String>().unwrap(), "hi, grappelli");
}
