use beacon_agent::core::health::{
    AlertState, Decision, NotificationScheduler, SendReason, Verdict,
};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const RESEND: Duration = Duration::from_secs(600);

fn at(secs: u64) -> Instant {
    static BASE: OnceLock<Instant> = OnceLock::new();
    *BASE.get_or_init(Instant::now) + Duration::from_secs(secs)
}

fn bad() -> Verdict {
    Verdict {
        ok: false,
        reasons: vec!["Disk threshold reached at / at 95% used".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_ten_second_polling_sends_heartbeat_every_interval() {
    let mut scheduler = NotificationScheduler::new(RESEND);
    let good = Verdict::healthy();

    let sent: Vec<u64> = (0..=130)
        .map(|i| i * 10)
        .filter(|&t| scheduler.observe(&good, at(t)).should_send())
        .collect();

    // Startup send, then strictly more than 600s later
    assert_eq!(sent, vec![0, 610, 1220]);
}

#[test]
fn test_incident_lifecycle() {
    let mut scheduler = NotificationScheduler::new(RESEND);
    let good = Verdict::healthy();

    assert_eq!(scheduler.observe(&good, at(0)), Decision::Send(SendReason::Heartbeat));
    assert_eq!(scheduler.alert_state(), AlertState::Quiet);

    assert_eq!(scheduler.observe(&bad(), at(10)), Decision::Send(SendReason::Breach));
    assert_eq!(scheduler.alert_state(), AlertState::Alerting);

    // Every bad cycle is reported, so the heartbeat never becomes due
    for t in (20..=620).step_by(10) {
        assert_eq!(
            scheduler.observe(&bad(), at(t)),
            Decision::Send(SendReason::Breach),
            "t={}",
            t
        );
        assert_eq!(scheduler.state().last_sent_at, Some(at(t)));
    }

    assert_eq!(scheduler.observe(&good, at(630)), Decision::Send(SendReason::Recovery));
    assert_eq!(scheduler.alert_state(), AlertState::Quiet);
    assert_eq!(scheduler.observe(&good, at(640)), Decision::Skip);
    assert_eq!(scheduler.state().last_sent_at, Some(at(630)));
}

#[test]
fn test_bad_then_bad_then_good_sends_every_cycle() {
    let mut scheduler = NotificationScheduler::new(RESEND);
    scheduler.observe(&Verdict::healthy(), at(0));

    let decisions: Vec<Decision> = [(bad(), 10), (bad(), 20), (Verdict::healthy(), 30)]
        .iter()
        .map(|(verdict, t)| scheduler.observe(verdict, at(*t)))
        .collect();

    assert_eq!(
        decisions,
        vec![
            Decision::Send(SendReason::Breach),
            Decision::Send(SendReason::Breach),
            Decision::Send(SendReason::Recovery),
        ]
    );
}
