//! End-to-end loading across transitions: memoization, chaining, and
//! recomputation

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wayload_core::{AnyLoader, Loader, Manager, Scope};
use wayload_route::{RouteAttributes, RouteParams};
use wayload_test_utils::{init_tracing, result_as, string_attrib};

fn user_loader(loads: &Arc<AtomicUsize>) -> Arc<Loader<String>> {
    let loads = Arc::clone(loads);
    Loader::new(move |scope, _previous: Option<Arc<String>>| {
        loads.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::task::yield_now().await;
            Ok(scope
                .path_value("name")?
                .unwrap_or_else(|| "missing".to_string()))
        }
    })
}

fn message_loader(user: &Arc<Loader<String>>) -> Arc<Loader<String>> {
    let user = Arc::clone(user);
    Loader::new(move |scope, previous: Option<Arc<String>>| {
        let user = Arc::clone(&user);
        async move {
            let name = user.get_result(&scope).await?;
            let verb = scope
                .attribute::<String>("verb")
                .map_or_else(|| "?".to_string(), |v| (*v).clone());
            let message = scope.query_value("message")?.unwrap_or_else(|| "?".to_string());
            tokio::task::yield_now().await;

            let mut parts = vec![(*name).clone(), verb, message.clone()];
            if previous.is_some_and(|p| p.contains(&*name) && p.contains(&message)) {
                parts.push("again".to_string());
            }
            Ok(parts.join(" "))
        }
    })
}

#[tokio::test]
async fn conversation_across_transitions() {
    init_tracing();
    let manager = Manager::default();
    let loads = Arc::new(AtomicUsize::new(0));
    let user = user_loader(&loads);
    let message = message_loader(&user);
    let user_only: Vec<Arc<dyn AnyLoader>> = vec![user.clone()];
    let with_message: Vec<Arc<dyn AnyLoader>> = vec![message.clone()];

    let results = manager
        .start_transition(
            "user",
            &user_only,
            RouteParams::new().with_path("name", ["Eve"]),
            RouteAttributes::new(),
        )
        .await
        .unwrap();
    manager.end_transition();
    assert_eq!(*result_as::<String>(&results[0]), "Eve");

    let results = manager
        .start_transition(
            "message",
            &with_message,
            RouteParams::new()
                .with_path("name", ["Eve"])
                .with_query("message", ["hi"]),
            string_attrib("verb", "says"),
        )
        .await
        .unwrap();
    manager.end_transition();
    assert_eq!(*result_as::<String>(&results[0]), "Eve says hi");
    // The user loader's input did not change, so it was not recomputed.
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    let results = manager
        .start_transition(
            "message",
            &with_message,
            RouteParams::new()
                .with_path("name", ["Adam"])
                .with_query("message", ["hi"]),
            string_attrib("verb", "says"),
        )
        .await
        .unwrap();
    manager.end_transition();
    assert_eq!(*result_as::<String>(&results[0]), "Adam says hi");
    assert_eq!(loads.load(Ordering::SeqCst), 2);

    let results = manager
        .start_transition(
            "message",
            &with_message,
            RouteParams::new()
                .with_path("name", ["Adam"])
                .with_query("message", ["what are you hiding"]),
            string_attrib("verb", "asks"),
        )
        .await
        .unwrap();
    manager.end_transition();
    assert_eq!(
        *result_as::<String>(&results[0]),
        "Adam asks what are you hiding"
    );

    // Same name and message as last time: the chained previous result
    // marks the repetition.
    let results = manager
        .start_transition(
            "message",
            &with_message,
            RouteParams::new()
                .with_path("name", ["Adam"])
                .with_query("message", ["what are you hiding"]),
            string_attrib("verb", "whispers"),
        )
        .await
        .unwrap();
    manager.end_transition();
    assert_eq!(
        *result_as::<String>(&results[0]),
        "Adam whispers what are you hiding again"
    );

    let results = manager
        .start_transition(
            "user",
            &user_only,
            RouteParams::new().with_path("name", ["Adam"]),
            RouteAttributes::new(),
        )
        .await
        .unwrap();
    manager.end_transition();
    assert_eq!(*result_as::<String>(&results[0]), "Adam");
}

#[tokio::test]
async fn identical_transitions_reuse_the_cached_result() {
    let manager = Manager::default();
    let loads = Arc::new(AtomicUsize::new(0));
    let user = user_loader(&loads);
    let loaders: Vec<Arc<dyn AnyLoader>> = vec![user.clone()];
    let params = RouteParams::new().with_path("name", ["Eve"]);

    let first = manager
        .start_transition("a", &loaders, params.clone(), RouteAttributes::new())
        .await
        .unwrap();
    manager.end_transition();
    let epoch = user.current_epoch();

    let second = manager
        .start_transition("b", &loaders, params, RouteAttributes::new())
        .await
        .unwrap();
    manager.end_transition();

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(user.current_epoch(), epoch);
    // The very same result allocation is handed out again.
    assert!(Arc::ptr_eq(&first[0], &second[0]));
}

#[tokio::test]
async fn attribute_identity_governs_reuse() {
    let manager = Manager::default();
    let loads = Arc::new(AtomicUsize::new(0));
    let loader = {
        let loads = Arc::clone(&loads);
        Loader::new(move |scope, _previous: Option<Arc<String>>| {
            loads.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(scope
                    .attribute::<String>("verb")
                    .map_or_else(String::new, |v| (*v).clone()))
            }
        })
    };
    let loaders: Vec<Arc<dyn AnyLoader>> = vec![loader];

    // Rebuilt attribute sets carry fresh allocations, so every transition
    // recomputes even though the textual value is identical.
    for _ in 0..2 {
        manager
            .start_transition(
                "t",
                &loaders,
                RouteParams::new(),
                string_attrib("verb", "says"),
            )
            .await
            .unwrap();
        manager.end_transition();
    }
    assert_eq!(loads.load(Ordering::SeqCst), 2);

    // A shared attribute set is identical across transitions and reuses.
    let attribs = string_attrib("verb", "says");
    for _ in 0..2 {
        manager
            .start_transition("t", &loaders, RouteParams::new(), attribs.clone())
            .await
            .unwrap();
        manager.end_transition();
    }
    assert_eq!(loads.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn sibling_failure_does_not_stop_others() {
    let manager = Manager::default();
    let ran = Arc::new(AtomicUsize::new(0));
    let failing = Loader::new(|_scope, _previous: Option<Arc<String>>| async move {
        Err::<String, _>(wayload_core::LoadError::message("backend down"))
    });
    let succeeding = {
        let ran = Arc::clone(&ran);
        Loader::new(move |_scope, _previous: Option<Arc<String>>| {
            let ran = Arc::clone(&ran);
            async move {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok("ok".to_string())
            }
        })
    };
    let loaders: Vec<Arc<dyn AnyLoader>> = vec![failing, succeeding];

    let outcome = manager
        .start_transition("t", &loaders, RouteParams::new(), RouteAttributes::new())
        .await;
    manager.end_transition();

    assert!(matches!(
        outcome,
        Err(wayload_core::TransitionError::Loader(_))
    ));
    // Settle-all semantics: the sibling still ran and registered.
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}
