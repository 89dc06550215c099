//! Behaviour tests for discussion threads, comments and moderation.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// Not every suite uses every helper of the shared world.
#[allow(dead_code)]
#[path = "support/api_world.rs"]
mod api_world;
#[allow(dead_code)]
#[path = "support/common_steps.rs"]
mod common_steps;

use actix_web::http::Method;
use api_world::WorldFixture;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

#[fixture]
fn world() -> WorldFixture {
    api_world::world()
}

fn thread_detail(world: &WorldFixture) -> Value {
    let thread_id = world.recall_str("thread");
    let detail = world.send(
        None,
        Method::GET,
        &format!("/api/v1/discussions/{thread_id}"),
        None,
    );
    assert_eq!(world.last().status, 200, "thread: {detail}");
    detail
}

fn comment(world: &WorldFixture, actor: Option<&str>, parent: Option<Value>) -> Value {
    let thread_id = world.recall_str("thread");
    world.send(
        actor,
        Method::POST,
        &format!("/api/v1/discussions/{thread_id}/comments"),
        Some(json!({ "content": "The school hall opens at seven.", "parentId": parent })),
    )
}

#[given("the {user} has opened a thread titled {title}")]
fn the_user_has_opened_a_thread(world: &WorldFixture, user: String, title: String) {
    // Later threads show later activity.
    world.advance_seconds(60);
    let thread = world.send(
        Some(&user),
        Method::POST,
        "/api/v1/discussions",
        Some(json!({ "title": title, "content": "Where do I vote this year?" })),
    );
    assert_eq!(world.last().status, 201, "thread: {thread}");
    world.remember(&format!("thread:{title}"), thread["id"].clone());
    world.remember("thread", thread["id"].clone());
}

#[when("the {user} comments on the thread")]
fn the_user_comments_on_the_thread(world: &WorldFixture, user: String) {
    let created = comment(world, Some(&user), None);
    if world.last().status == 201 {
        world.remember("comment", created["id"].clone());
    }
}

#[when("a visitor comments on the thread")]
fn a_visitor_comments_on_the_thread(world: &WorldFixture) {
    comment(world, None, None);
}

#[when("the {user} replies to that comment")]
fn the_user_replies_to_that_comment(world: &WorldFixture, user: String) {
    let reply = comment(world, Some(&user), Some(world.recall("comment")));
    assert_eq!(world.last().status, 201, "reply: {reply}");
    assert_eq!(reply["parentId"], world.recall("comment"));
}

#[when("the {user} likes the comment")]
fn the_user_likes_the_comment(world: &WorldFixture, user: String) {
    let comment_id = world.recall_str("comment");
    world.send(
        Some(&user),
        Method::POST,
        &format!("/api/v1/comments/{comment_id}/like"),
        None,
    );
}

#[when("the {user} edits the comment")]
fn the_user_edits_the_comment(world: &WorldFixture, user: String) {
    let comment_id = world.recall_str("comment");
    world.send(
        Some(&user),
        Method::PUT,
        &format!("/api/v1/comments/{comment_id}"),
        Some(json!({ "content": "The school hall opens at half seven." })),
    );
}

#[when("the {user} deletes the comment")]
fn the_user_deletes_the_comment(world: &WorldFixture, user: String) {
    let comment_id = world.recall_str("comment");
    world.send(
        Some(&user),
        Method::DELETE,
        &format!("/api/v1/admin/comments/{comment_id}"),
        None,
    );
}

#[when("the {user} closes the thread")]
fn the_user_closes_the_thread(world: &WorldFixture, user: String) {
    let thread_id = world.recall_str("thread");
    world.send(
        Some(&user),
        Method::PUT,
        &format!("/api/v1/admin/discussions/{thread_id}/moderation"),
        Some(json!({ "status": "closed" })),
    );
    assert_eq!(world.last().status, 200);
}

#[when("the {user} pins the thread titled {title}")]
fn the_user_pins_the_thread(world: &WorldFixture, user: String, title: String) {
    let thread_id = world.recall_str(&format!("thread:{title}"));
    let thread = world.send(
        Some(&user),
        Method::PUT,
        &format!("/api/v1/admin/discussions/{thread_id}/moderation"),
        Some(json!({ "isPinned": true })),
    );
    assert_eq!(thread["isPinned"], true, "thread: {thread}");
    assert_eq!(thread["status"], "open");
}

#[then("the thread shows {count} top-level comment with {replies} reply")]
fn the_thread_shows_nested_comments(world: &WorldFixture, count: usize, replies: usize) {
    let detail = thread_detail(world);
    let comments = detail["comments"].as_array().expect("comments");
    assert_eq!(comments.len(), count);
    let nested = comments
        .first()
        .and_then(|first| first["replies"].as_array())
        .expect("replies");
    assert_eq!(nested.len(), replies);
}

#[then("the thread shows {count} top-level comments")]
fn the_thread_shows_comments(world: &WorldFixture, count: usize) {
    let detail = thread_detail(world);
    let comments = detail["comments"].as_array().expect("comments");
    assert_eq!(comments.len(), count);
}

#[then("the comment has {count} likes")]
fn the_comment_has_likes(world: &WorldFixture, count: i64) {
    let last = world.last();
    assert_eq!(last.status, 200, "like: {}", last.body);
    assert_eq!(last.body["likesCount"].as_i64(), Some(count));
    assert_eq!(last.body["liked"], count > 0);
}

#[then("the comment is marked as edited")]
fn the_comment_is_marked_as_edited(world: &WorldFixture) {
    let body = world.last().body;
    assert_eq!(body["isEdited"], true);
    assert_eq!(body["content"], "The school hall opens at half seven.");
}

#[then("the first listed thread is {title}")]
fn the_first_listed_thread_is(world: &WorldFixture, title: String) {
    let page = world.send(None, Method::GET, "/api/v1/discussions", None);
    assert_eq!(page["items"][0]["thread"]["title"], title.as_str(), "page: {page}");
}

#[scenario(
    path = "tests/features/discussions.feature",
    name = "Replies nest under their parent comment"
)]
fn replies_nest_under_their_parent(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/discussions.feature",
    name = "Liking twice removes the like"
)]
fn liking_twice_removes_the_like(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/discussions.feature",
    name = "Closed threads reject comments"
)]
fn closed_threads_reject_comments(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/discussions.feature",
    name = "Pinned threads lead the list"
)]
fn pinned_threads_lead_the_list(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/discussions.feature",
    name = "Deleting a comment removes its replies"
)]
fn deleting_a_comment_removes_its_replies(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/discussions.feature",
    name = "Only authors edit their comments"
)]
fn only_authors_edit_their_comments(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/discussions.feature",
    name = "Anonymous visitors cannot comment"
)]
fn anonymous_visitors_cannot_comment(world: WorldFixture) {
    drop(world);
}
