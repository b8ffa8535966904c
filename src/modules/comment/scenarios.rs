use std::sync::Arc;
use uuid::Uuid;
use crate::{
    error::ServiceError,
    modules::{
        comment::{
            compose, edit,
            gate::Actor,
            model::{Comment, ModerationStatus},
            moderation, reaction,
            store::CommentStore,
            testutil::MemoryStore,
            tree::{self, Locator},
        },
        product::model::ProductRepository,
        user::model::{Role, User},
    },
};

fn actor(user: &User) -> Actor {
    Actor::from(user)
}

async fn seeded() -> (MemoryStore, Uuid, User, User, User, User) {
    let store = MemoryStore::new();
    let product_id = store.seed_product();
    let u1 = store.seed_user("Alice", Role::Customer);
    let u2 = store.seed_user("Bob", Role::Customer);
    let u3 = store.seed_user("Carol", Role::Customer);
    let admin = store.seed_user("Root", Role::Admin);
    (store, product_id, u1, u2, u3, admin)
}

#[tokio::test]
async fn scenario_a_nested_composition() {
    let (store, product_id, u1, u2, u3, _) = seeded().await;

    let root = compose::add_root_comment(
        &store,
        &store,
        product_id,
        u1.id,
        "Great product, fast shipping".to_string(),
    )
    .await
    .unwrap();
    assert_eq!(root.status, ModerationStatus::Approved);
    assert!(root.open_to_replies);
    assert_eq!(store.product_comment_ids(product_id), vec![root.id]);

    let first = compose::add_reply(&store, root.id, u2.id, "Agreed!".to_string())
        .await
        .unwrap();
    assert_eq!(first.parent_comment_id, root.id);
    assert_eq!(first.parent_reply_id, None);
    let resolved = tree::resolve(&store, first.id).await.unwrap();
    assert_eq!(
        resolved.locator,
        Locator::FirstLevel { root_id: root.id, reply_id: first.id }
    );

    let nested = compose::add_reply(&store, first.id, u3.id, "Me too".to_string())
        .await
        .unwrap();
    assert_eq!(nested.parent_comment_id, root.id);
    assert_eq!(nested.parent_reply_id, Some(first.id));
    let resolved = tree::resolve(&store, nested.id).await.unwrap();
    assert_eq!(
        resolved.locator,
        Locator::Nested {
            root_id: root.id,
            parent_reply_id: first.id,
            reply_id: nested.id,
        }
    );
}

#[tokio::test]
async fn fresh_reply_resolves_to_its_root_at_any_depth() {
    let (store, product_id, u1, u2, _, _) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Solid build".to_string())
        .await
        .unwrap();
    let mut target = root.id;
    for depth in 0..4 {
        let reply = compose::add_reply(&store, target, u2.id, format!("Depth {depth}"))
            .await
            .unwrap();
        let resolved = tree::resolve(&store, reply.id).await.unwrap();
        assert_eq!(resolved.locator.root_id(), root.id);
        target = reply.id;
    }
}

#[tokio::test]
async fn scenario_b_reaction_flip() {
    let (store, product_id, u1, _, _, _) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Love it".to_string())
        .await
        .unwrap();

    let summary = reaction::toggle_like(&store, root.id, u1.id).await.unwrap();
    assert_eq!(summary.likes_count, 1);
    assert_eq!(summary.dislikes_count, 0);
    assert!(summary.user_liked);
    assert!(!summary.user_disliked);

    let summary = reaction::toggle_dislike(&store, root.id, u1.id).await.unwrap();
    assert_eq!(summary.likes_count, 0);
    assert_eq!(summary.dislikes_count, 1);
    assert!(!summary.user_liked);
    assert!(summary.user_disliked);
}

#[tokio::test]
async fn toggling_twice_returns_to_the_prior_state() {
    let (store, product_id, u1, u2, _, _) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Nice fit".to_string())
        .await
        .unwrap();

    reaction::toggle_like(&store, root.id, u2.id).await.unwrap();
    let summary = reaction::toggle_like(&store, root.id, u2.id).await.unwrap();
    assert_eq!(summary.likes_count, 0);
    assert!(!summary.user_liked);
    assert!(!summary.user_disliked);
}

#[tokio::test]
async fn reactions_stay_mutually_exclusive_under_interleaving() {
    let (store, product_id, u1, u2, u3, _) = seeded().await;
    let store = Arc::new(store);
    let root = compose::add_root_comment(&*store, &*store, product_id, u1.id, "Hot item".to_string())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for user in [u2.id, u3.id] {
        for round in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let result = if round % 2 == 0 {
                    reaction::toggle_like(&*store, root.id, user).await
                } else {
                    reaction::toggle_dislike(&*store, root.id, user).await
                };
                // A lost race is a Conflict by design; anything else is a bug.
                if let Err(err) = result {
                    assert!(matches!(err, ServiceError::Conflict(_)), "unexpected error: {err}");
                }
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = store.fetch_root(root.id).await.unwrap().unwrap();
    let likes = &stored.comment.likes;
    let dislikes = &stored.comment.dislikes;
    assert!(likes.intersection(dislikes).next().is_none(), "likes and dislikes overlap");
}

#[tokio::test]
async fn scenario_c_edit_is_ownership_only() {
    let (store, product_id, u1, u2, _, admin) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Decent value".to_string())
        .await
        .unwrap();

    let err = edit::edit_text(&store, root.id, actor(&u2), "Hijacked".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = edit::edit_text(&store, root.id, actor(&admin), "Cleaned up".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)), "no admin override on edits");
}

#[tokio::test]
async fn only_pending_text_is_editable() {
    let (store, product_id, u1, _, _, admin) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Could be better".to_string())
        .await
        .unwrap();

    // Auto-approved on create, so even the owner is locked out.
    let err = edit::edit_text(&store, root.id, actor(&u1), "Much better".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    moderation::set_status(&store, root.id, actor(&admin), ModerationStatus::Pending)
        .await
        .unwrap();
    let record = edit::edit_text(&store, root.id, actor(&u1), "Much better".to_string())
        .await
        .unwrap();
    assert_eq!(record.text, "Much better");

    moderation::set_status(&store, root.id, actor(&admin), ModerationStatus::Rejected)
        .await
        .unwrap();
    let err = edit::edit_text(&store, root.id, actor(&u1), "One more try".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn deleting_a_root_cascades_and_detaches_the_product() {
    let (store, product_id, u1, u2, _, _) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Works great".to_string())
        .await
        .unwrap();
    let reply = compose::add_reply(&store, root.id, u2.id, "Same here".to_string())
        .await
        .unwrap();

    edit::delete_node(&store, &store, root.id, actor(&u1)).await.unwrap();

    assert!(store.fetch_root(root.id).await.unwrap().is_none());
    assert!(store.product_comment_ids(product_id).is_empty());
    let err = tree::resolve(&store, reply.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_reply_keeps_siblings_and_root() {
    let (store, product_id, u1, u2, u3, _) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Quick delivery".to_string())
        .await
        .unwrap();
    let first = compose::add_reply(&store, root.id, u2.id, "Here too".to_string())
        .await
        .unwrap();
    let nested = compose::add_reply(&store, first.id, u3.id, "Third that".to_string())
        .await
        .unwrap();
    let sibling = compose::add_reply(&store, root.id, u3.id, "Took a week for me".to_string())
        .await
        .unwrap();

    edit::delete_node(&store, &store, first.id, actor(&u2)).await.unwrap();

    let stored = store.fetch_root(root.id).await.unwrap().unwrap();
    assert!(tree::node(&stored.comment, first.id).is_none());
    assert!(tree::node(&stored.comment, nested.id).is_none(), "subtree goes with its parent");
    assert!(tree::node(&stored.comment, sibling.id).is_some());
    assert_eq!(store.product_comment_ids(product_id), vec![root.id]);
}

#[tokio::test]
async fn delete_requires_author_or_admin() {
    let (store, product_id, u1, u2, _, admin) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Average at best".to_string())
        .await
        .unwrap();

    let err = edit::delete_node(&store, &store, root.id, actor(&u2)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    edit::delete_node(&store, &store, root.id, actor(&admin)).await.unwrap();
    assert!(store.fetch_root(root.id).await.unwrap().is_none());
}

#[tokio::test]
async fn closed_nodes_refuse_replies() {
    let (store, product_id, u1, u2, _, _) = seeded().await;
    let mut comment = Comment::new(product_id, u1.id, "Final word".to_string());
    comment.open_to_replies = false;
    store.create_root(&comment).await.unwrap();
    store.attach_comment(product_id, comment.id).await.unwrap();

    let err = compose::add_reply(&store, comment.id, u2.id, "But...".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn composition_against_missing_targets() {
    let (store, _, u1, _, _, _) = seeded().await;
    let err = compose::add_root_comment(&store, &store, Uuid::new_v4(), u1.id, "Ghost".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("product")));

    let err = compose::add_reply(&store, Uuid::new_v4(), u1.id, "Ghost".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("comment")));
}

#[tokio::test]
async fn moderation_requires_admin() {
    let (store, product_id, u1, u2, _, _) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Meh".to_string())
        .await
        .unwrap();
    let err = moderation::set_status(&store, root.id, actor(&u2), ModerationStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn any_status_is_reachable_from_any_status() {
    let (store, product_id, u1, _, _, admin) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Borderline".to_string())
        .await
        .unwrap();
    for status in [
        ModerationStatus::Rejected,
        ModerationStatus::Approved,
        ModerationStatus::Pending,
        ModerationStatus::Approved,
    ] {
        let record = moderation::set_status(&store, root.id, actor(&admin), status)
            .await
            .unwrap();
        assert_eq!(record.status, status);
    }
}

#[tokio::test]
async fn listing_filters_by_viewer_role() {
    let (store, product_id, u1, u2, _, admin) = seeded().await;
    let visible = compose::add_root_comment(&store, &store, product_id, u1.id, "Keep this".to_string())
        .await
        .unwrap();
    let hidden = compose::add_root_comment(&store, &store, product_id, u2.id, "Hide this".to_string())
        .await
        .unwrap();
    moderation::set_status(&store, hidden.id, actor(&admin), ModerationStatus::Pending)
        .await
        .unwrap();
    let flagged_reply = compose::add_reply(&store, visible.id, u2.id, "Spam-ish".to_string())
        .await
        .unwrap();
    moderation::set_status(&store, flagged_reply.id, actor(&admin), ModerationStatus::Rejected)
        .await
        .unwrap();

    let anonymous = moderation::list_for_product(&store, &store, product_id, None)
        .await
        .unwrap();
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0].id, visible.id);
    assert!(anonymous[0].replies.is_empty(), "rejected reply must be filtered");

    let customer = moderation::list_for_product(&store, &store, product_id, Some(actor(&u2)))
        .await
        .unwrap();
    assert_eq!(customer.len(), 1);

    let staff = moderation::list_for_product(&store, &store, product_id, Some(actor(&admin)))
        .await
        .unwrap();
    assert_eq!(staff.len(), 2);
    let visible_view = staff.iter().find(|view| view.id == visible.id).unwrap();
    assert_eq!(visible_view.replies.len(), 1);
    assert_eq!(visible_view.replies[0].status, ModerationStatus::Rejected);
}

#[tokio::test]
async fn listing_resolves_authors_and_viewer_flags() {
    let (store, product_id, u1, u2, _, _) = seeded().await;
    let root = compose::add_root_comment(&store, &store, product_id, u1.id, "Recommended".to_string())
        .await
        .unwrap();
    reaction::toggle_like(&store, root.id, u2.id).await.unwrap();

    let views = moderation::list_for_product(&store, &store, product_id, Some(actor(&u2)))
        .await
        .unwrap();
    let view = &views[0];
    assert_eq!(view.author.name, "Alice");
    assert!(view.author.avatar_url.is_some());
    assert_eq!(view.likes_count, 1);
    assert!(view.viewer_liked);
    assert!(!view.viewer_disliked);

    // The same listing through an anonymous viewer carries no flags.
    let views = moderation::list_for_product(&store, &store, product_id, None)
        .await
        .unwrap();
    assert!(!views[0].viewer_liked);
}

#[tokio::test]
async fn unknown_authors_get_a_placeholder_display() {
    let (store, product_id, _, _, _, _) = seeded().await;
    let orphan = Comment::new(product_id, Uuid::new_v4(), "Who wrote this".to_string());
    store.create_root(&orphan).await.unwrap();
    store.attach_comment(product_id, orphan.id).await.unwrap();

    let views = moderation::list_for_product(&store, &store, product_id, None)
        .await
        .unwrap();
    assert_eq!(views[0].author.name, "Deleted user");
    assert!(views[0].author.avatar_url.is_none());
}

#[tokio::test]
async fn listing_is_most_recent_first() {
    let (store, product_id, u1, _, _, _) = seeded().await;
    let mut ids = Vec::new();
    for text in ["First take", "Second take", "Third take"] {
        let comment = compose::add_root_comment(&store, &store, product_id, u1.id, text.to_string())
            .await
            .unwrap();
        ids.push(comment.id);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    let views = moderation::list_for_product(&store, &store, product_id, None)
        .await
        .unwrap();
    let listed: Vec<Uuid> = views.iter().map(|view| view.id).collect();
    ids.reverse();
    assert_eq!(listed, ids);
}
