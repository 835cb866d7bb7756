use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use switchboard::config::{Persona, Profile};
use switchboard::dispatch::channel::ChannelTransport;
use switchboard::dispatch::hub::SessionHub;
use switchboard::dispatch::subprocess::SubprocessTransport;
use switchboard::dispatch::{Delivery, DispatchResult, Dispatcher, Transport, Via};
use switchboard::error::ErrorKind;
use switchboard::orchestrator::Orchestrator;
use switchboard::registry::{Specialist, SpecialistRegistry, TransportKind};
use switchboard::render::ResponseKind;
use switchboard::task::Task;

/// Counts invocations and answers with a fixed line.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for Counting {
    async fn invoke(&self, specialist: &Specialist, _task: &Task) -> DispatchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let output = format!("handled by {}", specialist.label);
        Ok(Delivery {
            total_chars: output.chars().count(),
            output,
            via: Via::Subprocess,
        })
    }
}

fn shell(label: &str, keyword: &str, script: &str, timeout: Duration) -> Specialist {
    Specialist::new(
        label,
        label,
        [keyword],
        TransportKind::Subprocess {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                script.to_string(),
                "sh".to_string(),
                "{task}".to_string(),
            ],
        },
        timeout,
    )
}

fn shell_orchestrator(specialists: Vec<Specialist>) -> Orchestrator {
    let profile = Profile {
        persona: Persona::builtin(),
        registry: SpecialistRegistry::new(specialists).unwrap(),
    };
    let tmp = std::env::temp_dir();
    Orchestrator::new(profile, Dispatcher::new(Arc::new(SubprocessTransport::new(tmp))))
}

#[tokio::test]
async fn unrouted_task_never_dispatches() {
    let counting = Arc::new(Counting::default());
    let orchestrator = Orchestrator::new(Profile::builtin(), Dispatcher::new(counting.clone()));

    let response = orchestrator.handle(&Task::new("make me a sandwich")).await;

    assert_eq!(response.kind, ResponseKind::Unrouted);
    assert_eq!(response.text, "🎭 ❓ Not sure what you mean");
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn routed_task_dispatches_once() {
    let counting = Arc::new(Counting::default());
    let orchestrator = Orchestrator::new(Profile::builtin(), Dispatcher::new(counting.clone()));

    let response = orchestrator.handle(&Task::new("review my code")).await;

    assert_eq!(response.kind, ResponseKind::Completed);
    assert!(response.text.contains("Routing to Code Reviewer"));
    assert!(response.text.contains("handled by code-reviewer"));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn task_text_reaches_the_process() {
    let orchestrator = shell_orchestrator(vec![shell(
        "echo",
        "echo",
        r#"printf 'you said: %s' "$1""#,
        Duration::from_secs(5),
    )]);

    let response = orchestrator.handle(&Task::new("echo this back")).await;

    assert_eq!(response.kind, ResponseKind::Completed);
    assert!(response.text.ends_with("you said: echo this back"));
}

#[tokio::test]
async fn nonzero_exit_is_rendered_not_thrown() {
    let orchestrator = shell_orchestrator(vec![shell(
        "fragile",
        "explode",
        "echo boom >&2; exit 1",
        Duration::from_secs(5),
    )]);

    let response = orchestrator.handle(&Task::new("explode please")).await;

    assert_eq!(response.kind, ResponseKind::Failed(ErrorKind::NonZeroExit));
    assert!(response.text.contains("exited with status 1"));
    assert!(response.text.contains("boom"));
}

#[tokio::test]
async fn slow_specialist_times_out() {
    let orchestrator = shell_orchestrator(vec![shell(
        "sleepy",
        "nap",
        "sleep 5; echo rested",
        Duration::from_millis(300),
    )]);

    let started = Instant::now();
    let response = orchestrator.handle(&Task::new("take a nap")).await;

    assert_eq!(response.kind, ResponseKind::Failed(ErrorKind::Timeout));
    assert!(!response.text.contains("rested"));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn timed_out_specialist_process_is_killed() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("woke-up");
    let script = format!("sleep 1; touch '{}'", marker.display());
    let orchestrator = shell_orchestrator(vec![shell(
        "sleepy",
        "nap",
        &script,
        Duration::from_millis(200),
    )]);

    let response = orchestrator.handle(&Task::new("take a nap")).await;
    assert_eq!(response.kind, ResponseKind::Failed(ErrorKind::Timeout));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!marker.exists(), "timed-out specialist kept running");
}

#[tokio::test]
async fn trailing_newline_does_not_shorten_the_tail() {
    let orchestrator = shell_orchestrator(vec![shell(
        "chatty",
        "talk",
        "head -c 1000 /dev/zero | tr '\\0' 'z'; echo",
        Duration::from_secs(5),
    )]);

    let response = orchestrator.handle(&Task::new("talk to me")).await;

    assert!(response.text.contains(&format!("\n\n{}\n\n[showing last 500", "z".repeat(500))));
    assert!(response.text.ends_with("[showing last 500 of 1000 characters]"));
}

#[tokio::test]
async fn long_output_keeps_last_500_chars() {
    let orchestrator = shell_orchestrator(vec![shell(
        "chatty",
        "talk",
        "head -c 9500 /dev/zero | tr '\\0' 'a'; head -c 500 /dev/zero | tr '\\0' 'z'",
        Duration::from_secs(5),
    )]);

    let response = orchestrator.handle(&Task::new("talk to me")).await;

    assert_eq!(response.kind, ResponseKind::Completed);
    assert!(response.text.contains(&"z".repeat(500)));
    assert!(!response.text.contains("az"));
    assert!(response.text.contains("[showing last 500 of 10000 characters]"));
}

#[tokio::test]
async fn missing_binary_is_transport_failure() {
    let orchestrator = shell_orchestrator(vec![Specialist::new(
        "ghost",
        "Ghost",
        ["ghost"],
        TransportKind::Subprocess {
            command: vec!["bin/does-not-exist".to_string()],
        },
        Duration::from_secs(1),
    )]);

    let response = orchestrator.handle(&Task::new("ghost story")).await;

    assert_eq!(response.kind, ResponseKind::Failed(ErrorKind::TransportFailure));
    assert!(response.text.contains("could not be reached"));
}

#[tokio::test]
async fn corrupt_config_still_routes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("switchboard.json");
    std::fs::write(&path, r#"{"name": "Half a config""#).unwrap();

    let profile = Profile::load_or_default(Some(&path));
    assert_eq!(
        profile.registry.labels(),
        vec!["hedge-specialist", "code-reviewer", "researcher"]
    );

    let counting = Arc::new(Counting::default());
    let orchestrator = Orchestrator::new(profile, Dispatcher::new(counting.clone()));
    let response = orchestrator.handle(&Task::new("scan 20 markets")).await;

    assert!(response.text.contains("handled by hedge-specialist"));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn channel_specialist_round_trip() {
    let hub = Arc::new(SessionHub::new());
    let mut inbox = hub.register("researcher", 4).await;
    tokio::spawn(async move {
        while let Some(envelope) = inbox.recv().await {
            let reply = format!("queued: {}", envelope.request.message);
            envelope.reply(Ok(reply));
        }
    });

    let researcher = Specialist::new(
        "researcher",
        "Researcher",
        ["research"],
        TransportKind::ChannelSend {
            thinking: "low".to_string(),
        },
        Duration::from_secs(5),
    );
    let profile = Profile {
        persona: Persona::builtin(),
        registry: SpecialistRegistry::new(vec![researcher]).unwrap(),
    };
    let dispatcher = Dispatcher::new(Arc::new(Counting::default()))
        .with_channel(Arc::new(ChannelTransport::new(hub)));
    let orchestrator = Orchestrator::new(profile, dispatcher);

    let response = orchestrator.handle(&Task::new("research rivals")).await;

    assert_eq!(response.kind, ResponseKind::Delegated);
    assert!(response.text.contains("✅ Task delegated to Researcher: research rivals"));
    assert!(response.text.contains("queued: Task for Researcher: research rivals"));
}

#[tokio::test]
async fn channel_without_session_fails_cleanly() {
    let hub = Arc::new(SessionHub::new());
    let researcher = Specialist::new(
        "researcher",
        "Researcher",
        ["research"],
        TransportKind::ChannelSend {
            thinking: "low".to_string(),
        },
        Duration::from_secs(1),
    );
    let profile = Profile {
        persona: Persona::builtin(),
        registry: SpecialistRegistry::new(vec![researcher]).unwrap(),
    };
    let dispatcher = Dispatcher::new(Arc::new(Counting::default()))
        .with_channel(Arc::new(ChannelTransport::new(hub)));
    let orchestrator = Orchestrator::new(profile, dispatcher);

    let response = orchestrator.handle(&Task::new("research rivals")).await;

    assert_eq!(response.kind, ResponseKind::Failed(ErrorKind::TransportFailure));
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let orchestrator = Arc::new(shell_orchestrator(vec![
        shell("echo", "echo", r#"printf '%s' "$1""#, Duration::from_secs(5)),
        shell("fragile", "explode", "echo boom >&2; exit 1", Duration::from_secs(5)),
    ]));

    let tasks: Vec<String> = (0..8)
        .map(|i| {
            if i % 2 == 0 {
                format!("echo {i}")
            } else {
                format!("explode {i}")
            }
        })
        .collect();

    let responses = futures::future::join_all(tasks.iter().map(|t| {
        let orchestrator = Arc::clone(&orchestrator);
        let task = Task::new(t.clone());
        async move { orchestrator.handle(&task).await }
    }))
    .await;

    for (i, response) in responses.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(response.kind, ResponseKind::Completed);
            assert!(response.text.ends_with(&format!("echo {i}")));
        } else {
            assert_eq!(response.kind, ResponseKind::Failed(ErrorKind::NonZeroExit));
        }
    }
}

#[test]
fn capabilities_summarize_the_registry() {
    let orchestrator = Orchestrator::new(
        Profile::builtin(),
        Dispatcher::new(Arc::new(Counting::default())),
    );
    let help = orchestrator.capabilities();
    for name in ["Hedge Specialist", "Code Reviewer", "Researcher"] {
        assert!(help.contains(name));
    }
}
