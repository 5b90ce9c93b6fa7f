//! Scope behavior through the object graph

use grappelli_di::{
	DependencyMap, DiError, ObjectGraph, ScopeTag, SingletonScope, Spec, to_object,
};
use rstest::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn register_counter(graph: &ObjectGraph, scope: Option<&ScopeTag>) -> Arc<AtomicUsize> {
	let counter = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&counter);
	graph
		.register_factory(Spec::name("counter"), DependencyMap::new(), scope, move |_args| {
			Ok(to_object(seen.fetch_add(1, Ordering::SeqCst) + 1))
		})
		.unwrap();
	counter
}

#[rstest]
fn thread_scope_gives_each_thread_its_own_instance() {
	// Arrange
	let graph = ObjectGraph::new();
	let counter = register_counter(&graph, Some(&ScopeTag::THREAD));

	// Act: two resolutions here, two on another thread.
	let here_first = *graph.get_as::<usize>(&Spec::name("counter")).unwrap();
	let here_second = *graph.get_as::<usize>(&Spec::name("counter")).unwrap();

	let remote = Arc::clone(&graph);
	let (there_first, there_second) = std::thread::spawn(move || {
		let first = *remote.get_as::<usize>(&Spec::name("counter")).unwrap();
		let second = *remote.get_as::<usize>(&Spec::name("counter")).unwrap();
		(first, second)
	})
	.join()
	.unwrap();

	// Assert: one invocation per thread, caches disjoint.
	assert_eq!((here_first, here_second), (1, 1));
	assert_eq!(there_first, there_second);
	assert_ne!(here_first, there_first);
	assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[rstest]
fn process_scope_caches_within_the_process() {
	// Arrange
	let graph = ObjectGraph::new();
	let counter = register_counter(&graph, Some(&ScopeTag::PROCESS));

	// Act
	let first = graph.get(&Spec::name("counter")).unwrap();
	let second = graph.get(&Spec::name("counter")).unwrap();

	// Assert
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[rstest]
fn custom_scope_registers_and_caches() {
	// Arrange
	let graph = ObjectGraph::new();
	let request = ScopeTag::new("request");
	graph.register_scope(request.clone(), Arc::new(SingletonScope::new()));
	let counter = register_counter(&graph, Some(&request));

	// Act
	let first = graph.get(&Spec::name("counter")).unwrap();
	let second = graph.get(&Spec::name("counter")).unwrap();

	// Assert
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[rstest]
fn registering_against_an_unknown_scope_fails() {
	// Arrange
	let graph = ObjectGraph::new();

	// Act
	let err = graph
		.register_factory(
			Spec::name("value"),
			DependencyMap::new(),
			Some(&ScopeTag::new("session")),
			|_args| Ok(to_object(())),
		)
		.unwrap_err();

	// Assert
	assert!(matches!(err, DiError::UnknownScope(tag) if tag.as_str() == "session"));
}

#[rstest]
fn unregister_scope_round_trip() {
	// Arrange
	let graph = ObjectGraph::new();
	let request = ScopeTag::new("request");
	graph.register_scope(request.clone(), Arc::new(SingletonScope::new()));
	assert!(graph.scope_instance(&request).is_ok());

	// Act
	graph.unregister_scope(&request).unwrap();

	// Assert
	assert!(matches!(
		graph.scope_instance(&request),
		Err(DiError::UnknownScope(_))
	));
	assert!(matches!(
		graph.unregister_scope(&request),
		Err(DiError::UnknownScope(_))
	));
}

#[rstest]
fn providers_keep_their_scope_after_it_is_unregistered() {
	// Arrange
	let graph = ObjectGraph::new();
	let request = ScopeTag::new("request");
	graph.register_scope(request.clone(), Arc::new(SingletonScope::new()));
	let counter = register_counter(&graph, Some(&request));
	let first = graph.get(&Spec::name("counter")).unwrap();

	// Act: the provider holds the scope instance, not the tag.
	graph.unregister_scope(&request).unwrap();
	let second = graph.get(&Spec::name("counter")).unwrap();

	// Assert
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[rstest]
fn built_in_scopes_are_preregistered() {
	// Arrange
	let graph = ObjectGraph::new();

	// Act & Assert
	for tag in [ScopeTag::SINGLETON, ScopeTag::PROCESS, ScopeTag::THREAD] {
		assert!(graph.scope_instance(&tag).is_ok(), "missing scope {tag}");
	}
}
