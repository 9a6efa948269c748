//! Shared builders for work-order tests.

use crate::task::domain::{ChatId, NewTaskData, Status, Task, User, UserId};
use chrono::NaiveDate;
use mockable::DefaultClock;

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

pub fn new_task_data(supplier: User, executor: User, supervisor: User) -> NewTaskData {
    NewTaskData {
        title: "Заменить насос".to_owned(),
        task_type: "Ремонт".to_owned(),
        object: "Цех №1".to_owned(),
        status: Status::Planning,
        supplier,
        supervisor,
        executor,
        initial_plan_date: plan_date(),
        description: "Заменить циркуляционный насос в котельной".to_owned(),
        important: false,
    }
}

pub fn planning_task() -> Task {
    Task::new(
        new_task_data(supplier(), executor(), supervisor()),
        &DefaultClock,
    )
    .expect("planning is a valid initial status")
}

pub fn task_with_status(status: Status) -> Task {
    let task = planning_task();
    let mut data = task.to_persisted();
    data.status = status;
    Task::from_persisted(data, Vec::new())
}
