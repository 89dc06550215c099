//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command regenerates them from a migrated database.

diesel::table! {
    /// Registered accounts. `password_hash` holds an Argon2 PHC string.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        role -> Varchar,
        bio -> Nullable<Text>,
        profile_image_url -> Nullable<Text>,
        is_email_verified -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    learning_modules (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        description -> Text,
        content -> Text,
        created_by -> Nullable<Uuid>,
        status -> Varchar,
        sort_order -> Int4,
        image_url -> Nullable<Text>,
        attachment_url -> Nullable<Text>,
        difficulty_level -> Varchar,
        estimated_minutes -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        published_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    quizzes (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        module_id -> Uuid,
        created_by -> Nullable<Uuid>,
        difficulty -> Varchar,
        /// Maintained by the repository whenever questions change.
        total_questions -> Int4,
        passing_score -> Int4,
        time_limit_minutes -> Nullable<Int4>,
        is_published -> Bool,
        shuffle_questions -> Bool,
        show_answers -> Bool,
        max_attempts -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    questions (id) {
        id -> Uuid,
        quiz_id -> Uuid,
        text -> Text,
        question_type -> Varchar,
        sort_order -> Int4,
        explanation -> Nullable<Text>,
        points -> Int4,
    }
}

diesel::table! {
    choices (id) {
        id -> Uuid,
        question_id -> Uuid,
        text -> Text,
        is_correct -> Bool,
        sort_order -> Int4,
    }
}

diesel::table! {
    /// At most one row per (user_id, quiz_id) may have a null `completed_at`.
    quiz_attempts (id) {
        id -> Uuid,
        user_id -> Uuid,
        quiz_id -> Uuid,
        started_at -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
        score -> Nullable<Int4>,
        total_possible_score -> Int4,
        percentage -> Nullable<Float8>,
        is_passed -> Nullable<Bool>,
        questions_attempted -> Int4,
        questions_correct -> Int4,
        time_taken_seconds -> Nullable<Int8>,
    }
}

diesel::table! {
    question_answers (id) {
        id -> Uuid,
        attempt_id -> Uuid,
        question_id -> Uuid,
        selected_choice_id -> Nullable<Uuid>,
        is_correct -> Bool,
        answered_at -> Timestamptz,
    }
}

diesel::table! {
    discussion_threads (id) {
        id -> Uuid,
        title -> Varchar,
        content -> Text,
        author_id -> Uuid,
        module_id -> Nullable<Uuid>,
        status -> Varchar,
        is_pinned -> Bool,
        views_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Uuid,
        thread_id -> Uuid,
        author_id -> Uuid,
        content -> Varchar,
        parent_id -> Nullable<Uuid>,
        is_edited -> Bool,
        likes_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    comment_likes (comment_id, user_id) {
        comment_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(learning_modules -> users (created_by));
diesel::joinable!(quizzes -> learning_modules (module_id));
diesel::joinable!(questions -> quizzes (quiz_id));
diesel::joinable!(choices -> questions (question_id));
diesel::joinable!(quiz_attempts -> quizzes (quiz_id));
diesel::joinable!(question_answers -> quiz_attempts (attempt_id));
diesel::joinable!(discussion_threads -> learning_modules (module_id));
diesel::joinable!(comments -> discussion_threads (thread_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    learning_modules,
    quizzes,
    questions,
    choices,
    quiz_attempts,
    question_answers,
    discussion_threads,
    comments,
    comment_likes,
);
