//! Macro-generated end-to-end suite for `RelationManager`.
//!
//! `relation_manager_tests!` takes an expression producing a fresh
//! `Repositories` set, wires facades and the relation manager over it, and
//! checks the list bookkeeping, the denormalized names, the not-found paths
//! (nothing written) and both cascading deletes.

#[macro_export]
macro_rules! relation_manager_tests {
    ($factory:expr) => {
        mod relation_manager {
            use super::*;
            use hbnb::core::{HbnbError, patch_from};
            use hbnb::entities::{NewAmenity, NewPlace, NewReview};
            use hbnb::relations::EntityKind;
            use uuid::Uuid;

            // ==================================================================
            // Places under users
            // ==================================================================

            #[tokio::test]
            async fn test_place_is_listed_once_under_its_owner() {
                let hbnb = hbnb_over($factory);
                let owner = hbnb
                    .users
                    .create_user(user_draft("Johnny", "johnny@rock.io"))
                    .await
                    .unwrap();

                let place = hbnb
                    .relations
                    .create_place_for_user(&owner.id, place_draft("Chez Johnny"))
                    .await
                    .unwrap();

                assert_eq!(place.owner_id, owner.id);
                assert_eq!(place.owner_first_name, "Johnny");
                let owner = hbnb.users.get_user(&owner.id).await.unwrap();
                assert_eq!(owner.places.as_slice(), &[place.id]);
            }

            #[tokio::test]
            async fn test_owner_fields_from_draft_are_overwritten() {
                let hbnb = hbnb_over($factory);
                let owner = hbnb
                    .users
                    .create_user(user_draft("Johnny", "johnny@rock.io"))
                    .await
                    .unwrap();

                let draft = NewPlace {
                    owner_id: Some(Uuid::new_v4()),
                    owner_first_name: Some("Impostor".to_string()),
                    ..place_draft("Chez Johnny")
                };
                let place = hbnb
                    .relations
                    .create_place_for_user(&owner.id, draft)
                    .await
                    .unwrap();

                assert_eq!(place.owner_id, owner.id);
                assert_eq!(place.owner_first_name, "Johnny");
            }

            #[tokio::test]
            async fn test_owner_name_is_frozen_at_creation() {
                let hbnb = hbnb_over($factory);
                let owner = hbnb
                    .users
                    .create_user(user_draft("Johnny", "johnny@rock.io"))
                    .await
                    .unwrap();
                let place = hbnb
                    .relations
                    .create_place_for_user(&owner.id, place_draft("Chez Johnny"))
                    .await
                    .unwrap();

                hbnb.users
                    .update_user(&owner.id, patch_from(serde_json::json!({"first_name": "John"})))
                    .await
                    .unwrap();

                let place = hbnb.places.get_place(&place.id).await.unwrap();
                assert_eq!(place.owner_first_name, "Johnny");
            }

            #[tokio::test]
            async fn test_places_keep_creation_order() {
                let hbnb = hbnb_over($factory);
                let owner = hbnb
                    .users
                    .create_user(user_draft("Johnny", "johnny@rock.io"))
                    .await
                    .unwrap();

                let mut created = Vec::new();
                for title in ["First", "Second", "Third"] {
                    let place = hbnb
                        .relations
                        .create_place_for_user(&owner.id, place_draft(title))
                        .await
                        .unwrap();
                    created.push(place.id);
                }

                let listed: Vec<Uuid> = hbnb
                    .relations
                    .get_places_for_user(&owner.id)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|p| p.id)
                    .collect();
                assert_eq!(listed, created);
                assert_eq!(
                    hbnb.places
                        .get_all_places_from_owner_id(&owner.id)
                        .await
                        .unwrap()
                        .len(),
                    3
                );
            }

            #[tokio::test]
            async fn test_invalid_place_leaves_owner_untouched() {
                let hbnb = hbnb_over($factory);
                let owner = hbnb
                    .users
                    .create_user(user_draft("Johnny", "johnny@rock.io"))
                    .await
                    .unwrap();

                let draft = NewPlace {
                    latitude: 123.0,
                    ..place_draft("Off the map")
                };
                let err = hbnb
                    .relations
                    .create_place_for_user(&owner.id, draft)
                    .await
                    .unwrap_err();

                assert!(matches!(err, HbnbError::Validation(_)));
                assert!(hbnb.users.get_user(&owner.id).await.unwrap().places.is_empty());
                assert!(hbnb.places.get_all_places().await.unwrap().is_empty());
            }

            // ==================================================================
            // Amenities on places
            // ==================================================================

            #[tokio::test]
            async fn test_amenity_is_created_lazily_and_shared() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                let other = hbnb
                    .relations
                    .create_place_for_user(&n.owner.id, place_draft("Annex"))
                    .await
                    .unwrap();

                let first = hbnb
                    .relations
                    .add_amenity_to_a_place(&n.place.id, NewAmenity::new("Wifi"))
                    .await
                    .unwrap();
                let second = hbnb
                    .relations
                    .add_amenity_to_a_place(&other.id, NewAmenity::new(" Wifi "))
                    .await
                    .unwrap();

                assert_eq!(first.id, second.id);
                assert_eq!(hbnb.amenities.get_all_amenities().await.unwrap().len(), 1);
                assert!(
                    hbnb.places
                        .get_place(&other.id)
                        .await
                        .unwrap()
                        .amenities
                        .contains("Wifi")
                );
            }

            #[tokio::test]
            async fn test_existing_amenity_is_reused() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                let pool = hbnb
                    .amenities
                    .create_amenity(NewAmenity::new("Pool"))
                    .await
                    .unwrap();

                let attached = hbnb
                    .relations
                    .add_amenity_to_a_place(&n.place.id, NewAmenity::new("Pool"))
                    .await
                    .unwrap();
                assert_eq!(attached, pool);
            }

            #[tokio::test]
            async fn test_duplicate_amenity_is_a_conflict() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                hbnb.relations
                    .add_amenity_to_a_place(&n.place.id, NewAmenity::new("Wifi"))
                    .await
                    .unwrap();

                let err = hbnb
                    .relations
                    .add_amenity_to_a_place(&n.place.id, NewAmenity::new("Wifi"))
                    .await
                    .unwrap_err();

                assert!(matches!(err, HbnbError::Conflict { .. }), "got {:?}", err);
                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert_eq!(place.amenities.len(), 1);
            }

            #[tokio::test]
            async fn test_invalid_amenity_name_writes_nothing() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                for name in ["   ".to_string(), "x".repeat(51)] {
                    let err = hbnb
                        .relations
                        .add_amenity_to_a_place(&n.place.id, NewAmenity::new(name))
                        .await
                        .unwrap_err();
                    assert!(matches!(err, HbnbError::Validation(_)));
                }

                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert!(place.amenities.is_empty());
                assert!(hbnb.amenities.get_all_amenities().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_failed_amenity_creation_detaches_name() {
                let mut repositories = $factory;
                repositories.amenities = FailingAdds::wrap(repositories.amenities);
                let hbnb = hbnb_over(repositories);
                let n = neighbourhood(&hbnb).await;

                let err = hbnb
                    .relations
                    .add_amenity_to_a_place(&n.place.id, NewAmenity::new("Wifi"))
                    .await
                    .unwrap_err();

                assert!(matches!(err, HbnbError::Storage(_)), "got {:?}", err);
                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert!(place.amenities.is_empty());
                assert!(hbnb.amenities.get_all_amenities().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_detach_amenity_keeps_canonical_record() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                hbnb.relations
                    .add_amenity_to_a_place(&n.place.id, NewAmenity::new("Wifi"))
                    .await
                    .unwrap();
                hbnb.relations
                    .add_amenity_to_a_place(&n.place.id, NewAmenity::new("Sauna"))
                    .await
                    .unwrap();

                hbnb.relations
                    .delete_amenity_from_place_list("Wifi", &n.place.id)
                    .await
                    .unwrap();

                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert_eq!(place.amenities.iter().collect::<Vec<_>>(), vec!["Sauna"]);
                assert!(hbnb.amenities.get_amenity_by_name("Wifi").await.is_ok());

                let names: Vec<String> = hbnb
                    .relations
                    .get_amenities_for_place(&n.place.id)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|a| a.name)
                    .collect();
                assert_eq!(names, vec!["Sauna".to_string()]);
            }

            #[tokio::test]
            async fn test_detach_unattached_amenity() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                let err = hbnb
                    .relations
                    .delete_amenity_from_place_list("Jacuzzi", &n.place.id)
                    .await
                    .unwrap_err();
                assert!(err.is_not_found());
            }

            // ==================================================================
            // Reviews on places
            // ==================================================================

            #[tokio::test]
            async fn test_review_names_are_stamped() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                let draft = NewReview {
                    place_id: Some(Uuid::new_v4()),
                    place_name: Some("Elsewhere".to_string()),
                    user_id: Some(Uuid::new_v4()),
                    user_first_name: Some("Mallory".to_string()),
                    ..review_draft("Second visit", 4)
                };
                let review = hbnb
                    .relations
                    .create_review_for_place(&n.place.id, &n.guest.id, draft)
                    .await
                    .unwrap();

                assert_eq!(review.place_id, n.place.id);
                assert_eq!(review.place_name, n.place.title);
                assert_eq!(review.user_id, n.guest.id);
                assert_eq!(review.user_first_name, n.guest.first_name);

                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert_eq!(place.reviews.as_slice(), &[n.review.id, review.id]);
            }

            #[tokio::test]
            async fn test_invalid_review_writes_nothing() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                let err = hbnb
                    .relations
                    .create_review_for_place(&n.place.id, &n.guest.id, review_draft("Too good", 6))
                    .await
                    .unwrap_err();

                assert!(matches!(err, HbnbError::Validation(_)));
                assert_eq!(hbnb.reviews.get_all_reviews().await.unwrap().len(), 1);
                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert_eq!(place.reviews.len(), 1);
            }

            #[tokio::test]
            async fn test_review_reads() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                let annex = hbnb
                    .relations
                    .create_place_for_user(&n.owner.id, place_draft("Annex"))
                    .await
                    .unwrap();
                hbnb.relations
                    .create_review_for_place(&annex.id, &n.guest.id, review_draft("Cosy", 4))
                    .await
                    .unwrap();

                let by_guest = hbnb
                    .relations
                    .get_all_reviews_from_user(&n.guest.id)
                    .await
                    .unwrap();
                assert_eq!(by_guest.len(), 2);

                let on_place = hbnb
                    .relations
                    .get_all_reviews_from_place(&n.place.id)
                    .await
                    .unwrap();
                assert_eq!(on_place, vec![n.review.clone()]);

                assert!(
                    hbnb.relations
                        .get_all_reviews_from_user(&n.owner.id)
                        .await
                        .unwrap()
                        .is_empty()
                );
            }

            #[tokio::test]
            async fn test_delete_review_from_place_list() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                hbnb.relations
                    .delete_review_from_place_list(&n.review.id, &n.place.id)
                    .await
                    .unwrap();

                assert!(hbnb.places.get_place(&n.place.id).await.unwrap().reviews.is_empty());
                assert!(hbnb.reviews.get_review(&n.review.id).await.unwrap_err().is_not_found());
            }

            #[tokio::test]
            async fn test_delete_review_not_in_list() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                let annex = hbnb
                    .relations
                    .create_place_for_user(&n.owner.id, place_draft("Annex"))
                    .await
                    .unwrap();

                // the review belongs to the other place
                let err = hbnb
                    .relations
                    .delete_review_from_place_list(&n.review.id, &annex.id)
                    .await
                    .unwrap_err();

                assert!(err.is_not_found());
                assert!(hbnb.reviews.get_review(&n.review.id).await.is_ok());
                assert_eq!(
                    hbnb.places.get_place(&n.place.id).await.unwrap().reviews.len(),
                    1
                );
            }

            // ==================================================================
            // Not-found paths write nothing
            // ==================================================================

            #[tokio::test]
            async fn test_unknown_ids_leave_repositories_unmodified() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                let ghost = Uuid::new_v4();

                let before = counts(&hbnb).await;
                let owner_before = hbnb.users.get_user(&n.owner.id).await.unwrap();
                let place_before = hbnb.places.get_place(&n.place.id).await.unwrap();

                let results = vec![
                    hbnb.relations
                        .create_place_for_user(&ghost, place_draft("Nowhere"))
                        .await
                        .map(|_| ()),
                    hbnb.relations
                        .add_amenity_to_a_place(&ghost, NewAmenity::new("Wifi"))
                        .await
                        .map(|_| ()),
                    hbnb.relations
                        .delete_amenity_from_place_list("Wifi", &ghost)
                        .await,
                    hbnb.relations
                        .create_review_for_place(&ghost, &n.guest.id, review_draft("?", 3))
                        .await
                        .map(|_| ()),
                    hbnb.relations
                        .create_review_for_place(&n.place.id, &ghost, review_draft("?", 3))
                        .await
                        .map(|_| ()),
                    hbnb.relations
                        .delete_review_from_place_list(&n.review.id, &ghost)
                        .await,
                    hbnb.relations
                        .delete_review_from_place_list(&ghost, &n.place.id)
                        .await,
                    hbnb.relations
                        .delete_place_and_associated_instances(&ghost)
                        .await
                        .map(|_| ()),
                    hbnb.relations
                        .delete_user_and_associated_instances(&ghost)
                        .await
                        .map(|_| ()),
                ];

                for (i, result) in results.into_iter().enumerate() {
                    let err = result.expect_err("unknown id must fail");
                    assert!(err.is_not_found(), "operation {} returned {:?}", i, err);
                }

                assert_eq!(counts(&hbnb).await, before);
                assert_eq!(hbnb.users.get_user(&n.owner.id).await.unwrap(), owner_before);
                assert_eq!(hbnb.places.get_place(&n.place.id).await.unwrap(), place_before);
            }

            // ==================================================================
            // Cascading deletes
            // ==================================================================

            #[tokio::test]
            async fn test_delete_place_cascade() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                let annex = hbnb
                    .relations
                    .create_place_for_user(&n.owner.id, place_draft("Annex"))
                    .await
                    .unwrap();

                let report = hbnb
                    .relations
                    .delete_place_and_associated_instances(&n.place.id)
                    .await
                    .unwrap();

                assert!(report.is_complete(), "{:?}", report.failures);
                assert_eq!(report.deleted_ids(EntityKind::Place), vec![n.place.id]);
                assert_eq!(report.deleted_ids(EntityKind::Review), vec![n.review.id]);

                assert!(hbnb.places.get_place(&n.place.id).await.unwrap_err().is_not_found());
                assert!(hbnb.reviews.get_review(&n.review.id).await.unwrap_err().is_not_found());
                let owner = hbnb.users.get_user(&n.owner.id).await.unwrap();
                assert_eq!(owner.places.as_slice(), &[annex.id]);
                // reviewers are not touched
                assert!(hbnb.users.get_user(&n.guest.id).await.is_ok());
            }

            #[tokio::test]
            async fn test_delete_user_cascade() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;
                let p2 = hbnb
                    .relations
                    .create_place_for_user(&n.owner.id, place_draft("Annex"))
                    .await
                    .unwrap();

                let report = hbnb
                    .relations
                    .delete_user_and_associated_instances(&n.owner.id)
                    .await
                    .unwrap();

                assert!(report.is_complete(), "{:?}", report.failures);
                assert_eq!(report.deleted_ids(EntityKind::User), vec![n.owner.id]);
                assert_eq!(report.deleted_ids(EntityKind::Place), vec![n.place.id, p2.id]);
                assert_eq!(report.deleted_ids(EntityKind::Review), vec![n.review.id]);

                assert!(hbnb.users.get_user(&n.owner.id).await.unwrap_err().is_not_found());
                assert!(hbnb.places.get_place(&n.place.id).await.unwrap_err().is_not_found());
                assert!(hbnb.places.get_place(&p2.id).await.unwrap_err().is_not_found());
                assert!(hbnb.reviews.get_review(&n.review.id).await.unwrap_err().is_not_found());
                assert_eq!(counts(&hbnb).await, (1, 0, 0, 0));
            }

            #[tokio::test]
            async fn test_user_cascade_catches_place_created_midway() {
                let mut repositories = $factory;
                let places = PlaceCreatedOnDelete::new(repositories.places.clone());
                repositories.places = places.clone();
                let hbnb = hbnb_over(repositories);
                let n = neighbourhood(&hbnb).await;
                places.arm(hbnb.relations.clone(), n.owner.id);

                let report = hbnb
                    .relations
                    .delete_user_and_associated_instances(&n.owner.id)
                    .await
                    .unwrap();

                assert!(report.is_complete(), "{:?}", report.failures);
                assert_eq!(report.deleted_ids(EntityKind::Place).len(), 2);
                assert_eq!(report.deleted_ids(EntityKind::User), vec![n.owner.id]);
                assert!(hbnb.places.get_all_places().await.unwrap().is_empty());
                assert_eq!(counts(&hbnb).await, (1, 0, 0, 0));
            }

            #[tokio::test]
            async fn test_cascade_skips_missing_review() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                // direct facade deletes do not cascade, leaving a dangling id
                hbnb.reviews.delete_review(&n.review.id).await.unwrap();
                assert!(hbnb.places.get_place(&n.place.id).await.unwrap().reviews.contains(&n.review.id));

                let report = hbnb
                    .relations
                    .delete_user_and_associated_instances(&n.owner.id)
                    .await
                    .unwrap();

                assert_eq!(report.failures.len(), 1);
                assert_eq!(report.failures[0].kind, EntityKind::Review);
                assert_eq!(report.failures[0].id, n.review.id);
                assert!(hbnb.users.get_user(&n.owner.id).await.unwrap_err().is_not_found());
                assert!(hbnb.places.get_place(&n.place.id).await.unwrap_err().is_not_found());
            }

            #[tokio::test]
            async fn test_cascade_skips_dangling_place() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                hbnb.places.delete_place(&n.place.id).await.unwrap();

                let report = hbnb
                    .relations
                    .delete_user_and_associated_instances(&n.owner.id)
                    .await
                    .unwrap();

                assert_eq!(report.failures.len(), 1);
                assert_eq!(report.failures[0].kind, EntityKind::Place);
                assert_eq!(report.deleted_ids(EntityKind::User), vec![n.owner.id]);
                // the orphaned review is left behind
                assert!(hbnb.reviews.get_review(&n.review.id).await.is_ok());
            }

            #[tokio::test]
            async fn test_facade_delete_does_not_cascade() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                hbnb.users.delete_user(&n.owner.id).await.unwrap();

                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert_eq!(place.owner_id, n.owner.id);

                // the place cascade tolerates the missing owner
                let report = hbnb
                    .relations
                    .delete_place_and_associated_instances(&n.place.id)
                    .await
                    .unwrap();
                assert!(report.is_complete());
                assert_eq!(counts(&hbnb).await, (1, 0, 0, 0));
            }

            // ==================================================================
            // Round trip
            // ==================================================================

            #[tokio::test]
            async fn test_create_then_get_round_trip() {
                let hbnb = hbnb_over($factory);
                let n = neighbourhood(&hbnb).await;

                let review = hbnb.reviews.get_review(&n.review.id).await.unwrap();
                assert_eq!(review, n.review);
                assert!(review.updated_at >= review.created_at);

                let guest = hbnb.users.get_user(&n.guest.id).await.unwrap();
                assert_eq!(guest, n.guest);

                // the place gained a review after creation
                let place = hbnb.places.get_place(&n.place.id).await.unwrap();
                assert_eq!(place.title, n.place.title);
                assert_eq!(place.created_at, n.place.created_at);
                assert!(place.updated_at >= n.place.updated_at);
                assert!(place.updated_at >= place.created_at);

                let stored = hbnb.relations.get_places_for_user(&n.owner.id).await.unwrap();
                assert_eq!(stored, vec![place]);
            }
        }
    };
}
