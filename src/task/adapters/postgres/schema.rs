//! Diesel schema for work-order persistence.

diesel::table! {
    /// Task rows with embedded assignment snapshots.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Short title.
        #[max_length = 100]
        title -> Varchar,
        /// Work-order category label.
        #[max_length = 100]
        task_type -> Varchar,
        /// Object or location label.
        #[max_length = 100]
        object -> Varchar,
        /// Workflow status.
        #[max_length = 50]
        status -> Varchar,
        /// Supplier user snapshot.
        supplier -> Jsonb,
        /// Supervisor user snapshot.
        supervisor -> Jsonb,
        /// Executor user snapshot.
        executor -> Jsonb,
        /// Planned completion date at creation.
        initial_plan_date -> Date,
        /// Current planned completion date.
        actual_plan_date -> Date,
        /// Free-text description.
        description -> Text,
        /// Importance flag.
        important -> Bool,
        /// Times sent back for rework.
        rework_count -> Int4,
        /// Times the plan date moved.
        reschedule_count -> Int4,
        /// Notifications delivered.
        notification_count -> Int4,
        /// Last successful notification, if any.
        last_notification_at -> Nullable<Timestamptz>,
        /// Optimistic-concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit entries.
    comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Author snapshot, if a user acted.
        author -> Nullable<Jsonb>,
        /// Role tags the author held at write time.
        author_roles -> Jsonb,
        /// Typed payload.
        payload -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tasks, comments);
