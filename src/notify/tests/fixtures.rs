//! Shared harness and builders for notification tests.

use crate::notify::{
    adapters::memory::{InMemoryNotificationRepository, RecordingMessenger},
    services::Dispatcher,
};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{ChatId, NewTaskData, Status, Task, User, UserId},
    ports::TaskRepository,
};
use chrono::NaiveDate;
use mockable::DefaultClock;
use std::sync::Arc;

pub type TestDispatcher = Dispatcher<
    InMemoryNotificationRepository,
    RecordingMessenger,
    InMemoryTaskRepository,
    DefaultClock,
>;

pub struct DispatchHarness {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub messenger: Arc<RecordingMessenger>,
    pub dispatcher: TestDispatcher,
}

pub fn dispatch_harness() -> DispatchHarness {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let notifications = Arc::new(InMemoryNotificationRepository::new());
    let messenger = Arc::new(RecordingMessenger::new());
    let dispatcher = Dispatcher::new(
        Arc::clone(&notifications),
        Arc::clone(&messenger),
        Arc::clone(&tasks),
        Arc::new(DefaultClock),
    );
    DispatchHarness {
        tasks,
        notifications,
        messenger,
        dispatcher,
    }
}

pub fn user(last_name: &str, first_name: &str, chat: i64) -> User {
    User::new(UserId::new(), first_name, last_name, ChatId::new(chat))
}

pub fn supplier() -> User {
    user("Иванов", "Пётр", 100)
}

pub fn executor() -> User {
    user("Петров", "Семён", 200)
}

pub fn supervisor() -> User {
    user("Сидорова", "Ольга", 300)
}

pub fn plan_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 9, 1).expect("valid plan date")
}

pub fn make_task(
    status: Status,
    date: NaiveDate,
    supplier: User,
    executor: User,
    supervisor: User,
) -> Task {
    let data = NewTaskData {
        title: "Заменить насос".to_owned(),
        task_type: "Ремонт".to_owned(),
        object: "Цех №1".to_owned(),
        status: Status::Planning,
        supplier,
        supervisor,
        executor,
        initial_plan_date: date,
        description: "Заменить циркуляционный насос в котельной".to_owned(),
        important: false,
    };
    let built = Task::new(data, &DefaultClock).expect("planning is a valid initial status");
    let mut persisted = built.to_persisted();
    persisted.status = status;
    Task::from_persisted(persisted, Vec::new())
}

pub async fn seeded_task(harness: &DispatchHarness, status: Status) -> eyre::Result<Task> {
    let task = make_task(status, plan_date(), supplier(), executor(), supervisor());
    harness.tasks.store(&task).await?;
    Ok(task)
}
