mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use holon_agent::builtin::{Beat, HEARTBEAT_KIND};
use holon_agent::prelude::*;
use holon_agent::DistantKernelHandler;
use parking_lot::Mutex;

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<Message>>,
    broadcast: Mutex<Vec<Message>>,
    accept: bool,
}

impl DistantKernelHandler for Outbox {
    fn send_message(&self, message: Message) -> bool {
        if self.accept {
            self.sent.lock().push(message);
        }
        self.accept
    }

    fn broadcast_message(&self, message: Message) {
        self.broadcast.lock().push(message);
    }
}

#[test]
fn test_random_receiver_is_never_the_sender() {
    let kernel = kernel();
    let a = launch_light(&kernel, Probe::default());
    let b = launch_light(&kernel, Probe::default());

    for _ in 0..50 {
        let receiver = a.send_message(Message::new("ping"), &[a.address(), b.address()]);
        assert_eq!(receiver, Some(b.address()));
    }
    assert_eq!(b.mailbox().len(), 50);
    assert!(a.mailbox().is_empty());

    assert_eq!(a.send_message(Message::new("ping"), &[a.address()]), None);
    assert_eq!(a.send_message(Message::new("ping"), &[]), None);

    let received = b.take_message().unwrap();
    assert_eq!(received.sender, Some(a.address()));
    assert_eq!(received.receiver, Some(b.address()));
    assert!(received.creation_date.is_some());

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_unknown_receiver_goes_to_distant_kernel() {
    let kernel = kernel();
    let a = launch_light(&kernel, Probe::default());
    let elsewhere = AgentAddress::generate();

    assert_eq!(a.send_message(Message::new("ping"), &[elsewhere]), None);

    let outbox = Arc::new(Outbox {
        accept: true,
        ..Outbox::default()
    });
    kernel.set_distant_kernel_handler(Some(outbox.clone()));
    assert_eq!(
        a.send_message(Message::new("ping"), &[elsewhere]),
        Some(elsewhere)
    );
    let sent = outbox.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].sender, Some(a.address()));
    assert_eq!(sent[0].receiver, Some(elsewhere));
    drop(sent);

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_refused_candidate_is_excluded() {
    let kernel = kernel();
    let a = launch_light(&kernel, Probe::default());
    let b = launch_light(&kernel, Probe::default());
    kernel.set_distant_kernel_handler(Some(Arc::new(Outbox::default())));

    let elsewhere = AgentAddress::generate();
    for _ in 0..20 {
        let receiver = a.send_message(Message::new("ping"), &[elsewhere, b.address()]);
        assert_eq!(receiver, Some(b.address()));
    }

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_broadcast_reaches_every_local_agent() {
    let kernel = kernel();
    let outbox = Arc::new(Outbox::default());
    kernel.set_distant_kernel_handler(Some(outbox.clone()));
    let agents: Vec<_> = (0..3).map(|_| launch_light(&kernel, Probe::default())).collect();
    let sender = &agents[0];

    sender.broadcast_message(Message::new("hello"), &[]);
    for agent in &agents {
        let message = agent.take_message().unwrap();
        assert_eq!(message.sender, Some(sender.address()));
        assert_eq!(message.receiver, Some(agent.address()));
    }
    assert_eq!(outbox.broadcast.lock().len(), 1);

    sender.set_broadcast_feedback(false);
    sender.broadcast_message(Message::new("hello"), &[]);
    assert!(sender.mailbox().is_empty());
    assert_eq!(agents[1].mailbox().len(), 1);

    sender.broadcast_message(Message::new("listed"), &[agents[2].address()]);
    assert!(agents[1].take_message().unwrap().is_kind("hello"));
    assert!(agents[1].mailbox().is_empty());
    assert_eq!(agents[2].mailbox().len(), 2);

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_policy_selects_receiver() {
    let kernel = kernel();
    let a = launch_light(&kernel, Probe::default());
    let b = launch_light(&kernel, Probe::default());

    let first = |_: AgentAddress, candidates: &[AgentAddress]| candidates.first().copied();
    assert_eq!(a.send_message_with_policy(Message::new("ping"), &first), Some(b.address()));
    assert_eq!(b.mailbox().len(), 1);

    let nobody = |_: AgentAddress, _: &[AgentAddress]| -> Option<AgentAddress> { None };
    assert_eq!(a.send_message_with_policy(Message::new("ping"), &nobody), None);

    let outsider = AgentAddress::generate();
    let wrong = move |_: AgentAddress, _: &[AgentAddress]| Some(outsider);
    assert_eq!(a.send_message_with_policy(Message::new("ping"), &wrong), None);

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_policy_choice_outside_the_kernel_goes_distant() {
    let kernel = kernel();
    let a = launch_light(&kernel, Probe::default());
    let b = launch_light(&kernel, Probe::default());
    let elsewhere = AgentAddress::generate();
    let remote = move |_: AgentAddress, _: &[AgentAddress]| Some(elsewhere);

    assert_eq!(a.send_message_with_policy(Message::new("ping"), &remote), None);

    let outbox = Arc::new(Outbox {
        accept: true,
        ..Outbox::default()
    });
    kernel.set_distant_kernel_handler(Some(outbox.clone()));
    assert_eq!(
        a.send_message_with_policy(Message::new("ping"), &remote),
        Some(elsewhere)
    );
    {
        let sent = outbox.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].sender, Some(a.address()));
        assert_eq!(sent[0].receiver, Some(elsewhere));
    }
    assert!(b.mailbox().is_empty());

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_forward_and_reply() {
    let kernel = kernel();
    let a = launch_light(&kernel, Probe::default());
    let b = launch_light(&kernel, Probe::default());
    let c = launch_light(&kernel, Probe::default());

    a.send_message(Message::new("question"), &[b.address()]);
    let question = b.take_message().unwrap();

    assert_eq!(b.forward_message(question.clone(), &[c.address()]), Some(c.address()));
    let forwarded = c.take_message().unwrap();
    assert_eq!(forwarded.sender, Some(a.address()));
    assert_eq!(forwarded.receiver, Some(c.address()));

    b.set_forward_feedback(false);
    assert_eq!(b.forward_message(question.clone(), &[a.address()]), None);

    assert_eq!(b.reply_to(&question, Message::new("answer")), Some(a.address()));
    let answer = a.take_message().unwrap();
    assert!(answer.is_kind("answer"));
    assert_eq!(answer.sender, Some(b.address()));

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_relay_forwards_until_hop_budget() {
    let kernel = kernel();
    let (collector, inbox) = Collector::new();
    let target = launch_light(&kernel, collector);
    let relay = launch_light(&kernel, RelayAgent::new(vec![target.address()]).with_max_hops(1));
    let origin = launch_light(&kernel, Probe::default());

    origin.send_message(Message::new("news"), &[relay.address()]);
    assert!(wait_for(TIMEOUT, || !inbox.lock().is_empty()));
    {
        let inbox = inbox.lock();
        assert_eq!(inbox[0].sender, Some(origin.address()));
        assert_eq!(inbox[0].hops, 1);
    }

    let mut tired = Message::new("news");
    tired.hops = 1;
    origin.send_message(tired, &[relay.address()]);
    assert!(wait_for(TIMEOUT, || relay.mailbox().is_empty()));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(inbox.lock().len(), 1);

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}

#[test]
fn test_heartbeat_broadcasts_then_stops() {
    let kernel = kernel();
    let (collector, inbox) = Collector::new();
    launch_light(&kernel, collector);
    let heartbeat = launch_heavy(
        &kernel,
        HeartbeatAgent::new(Duration::from_millis(10)).with_max_beats(3),
    );

    assert!(heartbeat.wait_until_termination(Some(TIMEOUT)));
    assert!(heartbeat.mailbox().is_empty());
    assert!(wait_for(TIMEOUT, || inbox.lock().len() == 3));
    let beats: Vec<u64> = inbox
        .lock()
        .iter()
        .filter(|m| m.is_kind(HEARTBEAT_KIND))
        .map(|m| m.json::<Beat>().unwrap().beat)
        .collect();
    assert_eq!(beats, vec![1, 2, 3]);

    kernel.kill();
    assert!(kernel.wait_until_termination(Some(TIMEOUT)));
}
