// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::{Arc, Mutex};
use studio_booking::{
    Clock, CreditLedger, DispatchError, FixedClock, LedgerError, Notification,
    NotificationDispatcher, NotificationKind,
};
use studio_booking_audit::Cause;
use studio_booking_domain::{
    ActorRole, BookingPolicy, ClassCategory, Credits, EquipmentType, Subscription,
    SubscriptionStatus,
};
use studio_booking_persistence::{NewSubscription, Persistence};
use time::OffsetDateTime;
use time::macros::{date, datetime};

use crate::{
    ApiError, AuthenticatedActor, CreateBookingRequest, CreateBookingResponse, CreateClassRequest,
    EngineServices, create_booking, create_class,
};

/// 24 hours before the test classes start.
pub const NOW: OffsetDateTime = datetime!(2026-03-09 09:00 UTC);

/// When the test classes start.
pub const CLASS_START: OffsetDateTime = datetime!(2026-03-10 09:00 UTC);

/// Records every notification, optionally failing each delivery.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, user_id: i64, kind: NotificationKind) -> usize {
        self.sent()
            .iter()
            .filter(|n| n.user_id == user_id && n.kind == kind)
            .count()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn notify(&self, notification: &Notification) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(DispatchError::new(String::from("mail server down")));
        }
        Ok(())
    }
}

/// Records refunds and debits, optionally refusing refunds past a limit.
#[derive(Debug, Default)]
pub struct RecordingLedger {
    refunds: Mutex<Vec<(i64, i64)>>,
    debits: Mutex<Vec<(i64, i64)>>,
    fail_after: Option<usize>,
}

impl RecordingLedger {
    pub fn failing() -> Self {
        Self::failing_after(0)
    }

    /// Accepts `refunds` refunds, then refuses every further one.
    pub fn failing_after(refunds: usize) -> Self {
        Self {
            fail_after: Some(refunds),
            ..Self::default()
        }
    }

    pub fn refunds(&self) -> Vec<(i64, i64)> {
        self.refunds.lock().unwrap().clone()
    }

    pub fn debits(&self) -> Vec<(i64, i64)> {
        self.debits.lock().unwrap().clone()
    }
}

impl CreditLedger for RecordingLedger {
    fn debit_credit(&self, user_id: i64, class_id: i64) -> Result<(), LedgerError> {
        self.debits.lock().unwrap().push((user_id, class_id));
        Ok(())
    }

    fn refund_credit(&self, user_id: i64, class_id: i64) -> Result<(), LedgerError> {
        let mut refunds = self.refunds.lock().unwrap();
        if self.fail_after.is_some_and(|limit| refunds.len() >= limit) {
            return Err(LedgerError::new(String::from("ledger offline")));
        }
        refunds.push((user_id, class_id));
        Ok(())
    }
}

/// A store plus recording collaborators, with the clock stopped at [`NOW`].
pub struct TestStudio {
    pub persistence: Persistence,
    pub services: EngineServices,
    pub clock: Arc<FixedClock>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub ledger: Arc<RecordingLedger>,
}

impl TestStudio {
    pub fn new() -> Self {
        Self::with(RecordingDispatcher::default(), RecordingLedger::default())
    }

    pub fn with(dispatcher: RecordingDispatcher, ledger: RecordingLedger) -> Self {
        Self::with_persistence(Persistence::new_in_memory().unwrap(), dispatcher, ledger)
    }

    pub fn with_persistence(
        persistence: Persistence,
        dispatcher: RecordingDispatcher,
        ledger: RecordingLedger,
    ) -> Self {
        let clock: Arc<FixedClock> = Arc::new(FixedClock::new(NOW));
        let dispatcher: Arc<RecordingDispatcher> = Arc::new(dispatcher);
        let ledger: Arc<RecordingLedger> = Arc::new(ledger);
        let services: EngineServices = EngineServices::new(
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::clone(&dispatcher) as Arc<dyn NotificationDispatcher>,
            Arc::clone(&ledger) as Arc<dyn CreditLedger>,
            BookingPolicy::default(),
        );
        Self {
            persistence,
            services,
            clock,
            dispatcher,
            ledger,
        }
    }

    /// Registers a reformer group class at [`CLASS_START`].
    pub fn class(&mut self, capacity: i64) -> i64 {
        self.class_with("reformer", "group", capacity)
    }

    pub fn class_with(&mut self, equipment_type: &str, category: &str, capacity: i64) -> i64 {
        let request: CreateClassRequest = CreateClassRequest {
            name: String::from("Morning Reformer"),
            capacity,
            equipment_type: equipment_type.to_string(),
            category: category.to_string(),
            date: String::from("2026-03-10"),
            start_time: String::from("09:00"),
        };
        create_class(
            &mut self.persistence,
            &self.services,
            &request,
            &create_test_admin(),
            &create_test_cause(),
        )
        .unwrap()
        .response
        .class
        .class_id
    }

    /// Records an active reformer group subscription.
    pub fn subscription(&mut self, user_id: i64, credits: Credits) -> Subscription {
        self.subscription_with(user_id, credits, EquipmentType::Reformer, ClassCategory::Group)
    }

    pub fn subscription_with(
        &mut self,
        user_id: i64,
        credits: Credits,
        equipment_access: EquipmentType,
        category: ClassCategory,
    ) -> Subscription {
        self.persistence
            .create_subscription(&NewSubscription {
                user_id,
                plan_id: 3,
                credits,
                equipment_access,
                category,
                status: SubscriptionStatus::Active,
                start_date: date!(2026 - 01 - 01),
                end_date: date!(2026 - 06 - 30),
            })
            .unwrap()
    }

    pub fn credits_of(&mut self, subscription: &Subscription) -> Credits {
        self.persistence
            .get_subscription(subscription.subscription_id)
            .unwrap()
            .unwrap()
            .credits
    }

    /// Books as the member themself.
    pub fn book(&mut self, user_id: i64, class_id: i64) -> Result<CreateBookingResponse, ApiError> {
        create_booking(
            &mut self.persistence,
            &self.services,
            &CreateBookingRequest { user_id, class_id },
            &create_test_member(user_id),
            &create_test_cause(),
        )
        .map(|result| result.response)
    }

    /// Books and returns the confirmed booking id.
    pub fn book_confirmed(&mut self, user_id: i64, class_id: i64) -> i64 {
        match self.book(user_id, class_id).unwrap() {
            CreateBookingResponse::Confirmed { booking } => booking.booking_id,
            CreateBookingResponse::Waitlisted { entry } => {
                panic!("expected a seat, got waitlist position {}", entry.position)
            }
        }
    }

    /// Books a full class and returns the waitlist entry id.
    pub fn book_waitlisted(&mut self, user_id: i64, class_id: i64) -> i64 {
        match self.book(user_id, class_id).unwrap() {
            CreateBookingResponse::Waitlisted { entry } => entry.waitlist_id,
            CreateBookingResponse::Confirmed { booking } => {
                panic!("expected the waitlist, got booking {}", booking.booking_id)
            }
        }
    }

    pub fn waitlist_users(&mut self, class_id: i64) -> Vec<(u32, i64)> {
        self.persistence
            .waitlist_for_class(class_id)
            .unwrap()
            .iter()
            .map(|e| (e.position, e.user_id))
            .collect()
    }

    pub fn assert_invariants(&mut self, class_id: i64) {
        let report = self.persistence.check_class_invariants(class_id).unwrap();
        assert!(report.holds(), "invariants broken: {report:?}");
    }
}

pub fn create_test_member(user_id: i64) -> AuthenticatedActor {
    AuthenticatedActor::new(format!("member-{user_id}"), ActorRole::Member, Some(user_id))
}

pub fn create_test_reception() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("front-desk"), ActorRole::Reception, None)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), ActorRole::Admin, None)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn rule_of(err: &ApiError) -> &str {
    err.rule().unwrap_or("<not a rule violation>")
}
