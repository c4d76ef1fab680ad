use adminnotes_core::db::open_db_in_memory;
use adminnotes_core::model::module::MODULE_NAME;
use adminnotes_core::notice::text;
use adminnotes_core::{
    Actor, Clock, MemorySession, ModuleRepository, NoopCache, NotesService, RequestContext,
    SaveThrottle, SessionStore, SqliteModuleRepository, SqliteSessionStore, ThrottleConfig,
    ThrottleDecision,
};
use std::cell::Cell;
use std::time::Duration;

struct StepClock {
    now: Cell<i64>,
}

impl StepClock {
    fn at(now: i64) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for StepClock {
    fn now_secs(&self) -> i64 {
        self.now.get()
    }
}

fn editor() -> Actor {
    Actor::new(7, [8])
}

#[test]
fn eleventh_save_inside_window_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);
    let id = repo.create_module(MODULE_NAME).unwrap();
    let mut service = NotesService::new(repo, NoopCache);
    let mut session = MemorySession::new();
    let clock = StepClock::at(10_000);
    let mut ctx = RequestContext::new(editor(), &mut session, &clock);

    for round in 0..10 {
        let body = format!("<p>draft {round}</p>");
        assert!(service.save_data(&mut ctx, id, &body), "save {round}");
        clock.advance(1);
    }

    assert!(!service.save_data(&mut ctx, id, "<p>one too many</p>"));
    assert!(ctx.notices.contains(text::RATE_LIMIT_EXCEEDED));
    assert_eq!(
        service.get_data(&mut ctx, id).as_deref(),
        Some("<p>draft 9</p>")
    );
    assert_eq!(service.throttle().attempts(&*ctx.session, clock.now_secs()).len(), 10);
}

#[test]
fn saves_resume_once_the_oldest_attempt_leaves_the_window() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);
    let id = repo.create_module(MODULE_NAME).unwrap();
    let mut service = NotesService::new(repo, NoopCache);
    let mut session = MemorySession::new();
    let clock = StepClock::at(50_000);
    let mut ctx = RequestContext::new(editor(), &mut session, &clock);

    for _ in 0..10 {
        assert!(service.save_data(&mut ctx, id, "<p>burst</p>"));
    }
    clock.advance(59);
    assert!(!service.save_data(&mut ctx, id, "<p>still blocked</p>"));

    clock.advance(1);
    assert!(service.save_data(&mut ctx, id, "<p>window passed</p>"));
    assert_eq!(
        service.get_data(&mut ctx, id).as_deref(),
        Some("<p>window passed</p>")
    );
}

#[test]
fn failed_saves_count_but_rejections_do_not() {
    let conn = open_db_in_memory().unwrap();
    let throttle = ThrottleConfig {
        max_attempts: 2,
        window: Duration::from_secs(30),
    };
    let mut service = NotesService::with_throttle(
        SqliteModuleRepository::new(&conn),
        NoopCache,
        throttle,
    );
    let mut session = MemorySession::new();
    let clock = StepClock::at(1_000);
    let mut ctx = RequestContext::new(editor(), &mut session, &clock);

    assert!(!service.save_data(&mut ctx, 77_i64, "<p>missing</p>"));
    assert!(!service.save_data(&mut ctx, 77_i64, "<p>missing</p>"));
    assert!(!service.save_data(&mut ctx, 77_i64, "<p>missing</p>"));
    assert!(!service.save_data(&mut ctx, 77_i64, "<p>missing</p>"));

    let failed = ctx
        .notices
        .iter()
        .filter(|notice| notice.text.starts_with(text::FAILED))
        .count();
    let limited = ctx
        .notices
        .iter()
        .filter(|notice| notice.text == text::RATE_LIMIT_EXCEEDED)
        .count();
    assert_eq!((failed, limited), (2, 2));
    assert_eq!(service.throttle().attempts(&*ctx.session, 1_000), vec![1_000, 1_000]);
}

#[test]
fn sessions_are_throttled_independently() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);
    let id = repo.create_module(MODULE_NAME).unwrap();
    let throttle = ThrottleConfig {
        max_attempts: 1,
        window: Duration::from_secs(60),
    };
    let mut service = NotesService::with_throttle(repo, NoopCache, throttle);
    let clock = StepClock::at(5_000);

    let mut first_session = MemorySession::new();
    let mut first = RequestContext::new(editor(), &mut first_session, &clock);
    assert!(service.save_data(&mut first, id, "<p>a</p>"));
    assert!(!service.save_data(&mut first, id, "<p>b</p>"));

    let mut second_session = MemorySession::new();
    let mut second = RequestContext::new(editor(), &mut second_session, &clock);
    assert!(service.save_data(&mut second, id, "<p>c</p>"));
}

#[test]
fn persisted_session_keeps_history_between_requests() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);
    let id = repo.create_module(MODULE_NAME).unwrap();
    let throttle = ThrottleConfig {
        max_attempts: 3,
        window: Duration::from_secs(60),
    };
    let mut service = NotesService::with_throttle(repo, NoopCache, throttle);
    let clock = StepClock::at(9_000);

    let session_id = {
        let mut session = SqliteSessionStore::start(&conn);
        let mut ctx = RequestContext::new(editor(), &mut session, &clock);
        for _ in 0..3 {
            assert!(service.save_data(&mut ctx, id, "<p>first request</p>"));
        }
        session.session_id()
    };

    clock.advance(5);
    let mut session = SqliteSessionStore::new(&conn, session_id);
    let mut ctx = RequestContext::new(editor(), &mut session, &clock);
    assert!(!service.save_data(&mut ctx, id, "<p>second request</p>"));
    assert!(ctx.notices.contains(text::RATE_LIMIT_EXCEEDED));
}

#[test]
fn denial_reports_seconds_until_oldest_attempt_expires() {
    let throttle = SaveThrottle::new(ThrottleConfig {
        max_attempts: 2,
        window: Duration::from_secs(60),
    });
    let mut session = MemorySession::new();

    throttle.record(&mut session, 100);
    throttle.record(&mut session, 120);

    assert_eq!(
        throttle.check(&mut session, 130),
        ThrottleDecision::Denied {
            retry_after_secs: 30
        }
    );
    assert_eq!(
        throttle.check(&mut session, 160),
        ThrottleDecision::Allowed { remaining: 1 }
    );
    assert!(session.get("adminnotes.save_attempts").unwrap().is_some());
}
