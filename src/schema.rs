// Task manager schema - single task table for Diesel ORM

diesel::table! {
    tasks (id) {
        id -> Integer,
        description -> Text,
        due_date -> Nullable<Text>,
        priority -> Text,
        category -> Text,
        status -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}
