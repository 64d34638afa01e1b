use super::common::*;
use std::sync::{Arc, Barrier};
use std::thread;

use crate::workflows::hiring::domain::{Actor, JobPostingId, Role, Stage, ValidationError};
use crate::workflows::hiring::repository::{PipelineRepository, RepositoryError};
use crate::workflows::hiring::transition::TransitionRequest;
use crate::workflows::hiring::{HiringPipelineService, PipelineServiceError, RoundPlan};

#[test]
fn created_posting_uses_default_round_plan() {
    let (service, _, _) = build_service();
    let mut request = new_job_posting();
    request.rounds = None;

    let posting = service.create_job_posting(request).expect("posting created");

    let names: Vec<&str> = posting.rounds.iter().map(|round| round.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["pre-screen", "pre-interview", "round 1", "round 2", "hired", "rejected"]
    );
    assert!(posting.id.0.starts_with("job-"));
}

#[test]
fn created_posting_honours_requested_stage_two_count() {
    let (service, _, _) = build_service();
    let mut request = new_job_posting();
    request.rounds = None;
    request.stage_two_rounds = Some(1);

    let posting = service.create_job_posting(request).expect("posting created");
    let stage_two = posting
        .rounds
        .iter()
        .filter(|round| round.stage() == Some(Stage::StageTwo))
        .count();
    assert_eq!(stage_two, 1);

    let mut too_many = new_job_posting();
    too_many.rounds = None;
    too_many.stage_two_rounds = Some(5);
    assert!(matches!(
        service.create_job_posting(too_many),
        Err(PipelineServiceError::Validation(
            ValidationError::StageTwoRoundCount { actual: 5, .. }
        ))
    ));
}

#[test]
fn create_posting_validates_fields() {
    let (service, _, _) = build_service();

    let mut blank_title = new_job_posting();
    blank_title.title = "  ".to_string();
    assert!(matches!(
        service.create_job_posting(blank_title),
        Err(PipelineServiceError::Validation(ValidationError::BlankField { field: "title" }))
    ));

    let mut inverted = new_job_posting();
    inverted.compensation_start = 150_000;
    assert!(matches!(
        service.create_job_posting(inverted),
        Err(PipelineServiceError::Validation(
            ValidationError::CompensationRange { .. }
        ))
    ));
}

#[test]
fn submitted_application_starts_in_first_stage_one_round() {
    let (_, _, _, posting, application) = seeded_service();

    assert_eq!(application.status, "pre-screen");
    assert_eq!(application.job_id, posting.id);
    assert!(application.feedback.is_empty());
    assert_eq!(application.sub_vendor.as_deref(), Some("vendor-northwind"));
}

#[test]
fn submission_reports_every_missing_field() {
    let (service, _, _, posting, _) = seeded_service();
    let mut incomplete = submission(&posting.id, "");
    incomplete.candidate.phone.clear();

    match service.submit_application(incomplete) {
        Err(PipelineServiceError::Validation(ValidationError::MissingFields(fields))) => {
            assert_eq!(fields, vec!["email", "phone"]);
        }
        other => panic!("expected missing fields, got {other:?}"),
    }
}

#[test]
fn duplicate_email_for_same_job_is_rejected() {
    let (service, _, _, posting, _) = seeded_service();

    match service.submit_application(submission(&posting.id, "PRIYA@example.com ")) {
        Err(PipelineServiceError::DuplicateApplication { job_id, .. }) => {
            assert_eq!(job_id, posting.id);
        }
        other => panic!("expected duplicate application, got {other:?}"),
    }
}

#[test]
fn simultaneous_submissions_store_one_application_per_email() {
    let (service, repository, _, posting, _) = seeded_service();
    let submitters = 4;
    let barrier = Barrier::new(submitters);

    let accepted: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..submitters)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    service.submit_application(submission(&posting.id, "mei@example.com"))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("submitter thread"))
            .filter(|result| {
                if let Err(err) = result {
                    assert!(
                        matches!(err, PipelineServiceError::DuplicateApplication { .. }),
                        "unexpected error {err:?}"
                    );
                }
                result.is_ok()
            })
            .count()
    });

    assert_eq!(accepted, 1);
    let stored = repository
        .applications_for_job(&posting.id)
        .expect("list succeeds");
    assert_eq!(
        stored
            .iter()
            .filter(|record| record.candidate.email == "mei@example.com")
            .count(),
        1
    );
}

#[test]
fn submission_to_unknown_job_is_not_found() {
    let (service, _, _) = build_service();
    let missing = JobPostingId("job-missing".to_string());

    assert!(matches!(
        service.submit_application(submission(&missing, "ada@example.com")),
        Err(PipelineServiceError::JobPostingNotFound(_))
    ));
}

#[test]
fn admin_transition_is_stored_and_published() {
    let (service, repository, publisher, _, application) = seeded_service();
    let actor = Actor::with_id(Role::Admin, "recruiter-ops");

    let updated = service
        .transition(
            &actor,
            &application.id,
            TransitionRequest::new("round 1", "pre-screen", "Good culture fit"),
        )
        .expect("admin transition succeeds");

    assert_eq!(updated.status, "round 1");
    let stored = repository
        .fetch_application(&application.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, "round 1");
    assert_eq!(
        stored
            .feedback_for("pre-screen")
            .map(|entry| entry.feedback_text.as_str()),
        Some("Good culture fit")
    );

    let events = publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].from_round, "pre-screen");
    assert_eq!(events[0].to_round, "round 1");
    assert_eq!(events[0].moved_by, actor);
}

#[test]
fn refused_transition_leaves_store_untouched() {
    let (service, repository, publisher, _, application) = seeded_service();

    let result = service.transition(
        &Actor::new(Role::SubVendor),
        &application.id,
        TransitionRequest::new("round 1", "pre-screen", "Good culture fit"),
    );

    assert!(matches!(result, Err(PipelineServiceError::Authorization(_))));
    let stored = repository
        .fetch_application(&application.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, application);
    assert!(publisher.events().is_empty());
}

#[test]
fn server_side_feedback_check_runs_without_lookups() {
    let service = HiringPipelineService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryPublisher::default()),
        RoundPlan::default(),
    );

    let result = service.transition(
        &Actor::new(Role::Admin),
        &crate::workflows::hiring::ApplicationId("app-any".to_string()),
        TransitionRequest::new("round 1", "pre-screen", ""),
    );

    assert!(matches!(
        result,
        Err(PipelineServiceError::Validation(ValidationError::MissingFeedback))
    ));
}

#[test]
fn replayed_transition_is_not_published_twice() {
    let (service, repository, publisher, _, application) = seeded_service();
    let actor = Actor::new(Role::Admin);
    let request = TransitionRequest::new("round 1", "pre-screen", "x");

    service
        .transition(&actor, &application.id, request.clone())
        .expect("first transition");
    let replay = service
        .transition(&actor, &application.id, request)
        .expect("replay accepted");

    assert_eq!(replay.feedback.len(), 1);
    let stored = repository
        .fetch_application(&application.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.feedback.len(), 1);
    assert_eq!(publisher.events().len(), 1);
}

#[test]
fn transition_against_moved_card_is_a_conflict() {
    let (service, repository, _, _, application) = seeded_service();
    let mut moved = application.clone();
    moved.status = "rejected".to_string();
    repository.overwrite(moved);

    match service.transition(
        &Actor::new(Role::Admin),
        &application.id,
        TransitionRequest::new("round 1", "pre-screen", "Good culture fit"),
    ) {
        Err(PipelineServiceError::StatusConflict { expected, current }) => {
            assert_eq!(expected, "pre-screen");
            assert_eq!(current, "rejected");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn concurrent_writer_surfaces_as_conflict() {
    let inner = MemoryRepository::default();
    let repository = Arc::new(RacingRepository {
        inner,
        winner_status: "hired".to_string(),
    });
    let service = HiringPipelineService::new(
        repository.clone(),
        Arc::new(MemoryPublisher::default()),
        RoundPlan::default(),
    );
    let posting = service
        .create_job_posting(new_job_posting())
        .expect("posting created");
    let application = service
        .submit_application(submission(&posting.id, "lin@example.com"))
        .expect("application submitted");

    match service.transition(
        &Actor::new(Role::Admin),
        &application.id,
        TransitionRequest::new("round 1", "pre-screen", "Good culture fit"),
    ) {
        Err(PipelineServiceError::StatusConflict { current, .. }) => assert_eq!(current, "hired"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn publisher_outage_does_not_undo_the_move() {
    let repository = Arc::new(MemoryRepository::default());
    let service =
        HiringPipelineService::new(repository.clone(), Arc::new(OfflinePublisher), RoundPlan::default());
    let posting = service
        .create_job_posting(new_job_posting())
        .expect("posting created");
    let application = service
        .submit_application(submission(&posting.id, "sam@example.com"))
        .expect("application submitted");

    let updated = service
        .transition(
            &Actor::new(Role::Admin),
            &application.id,
            TransitionRequest::new("rejected", "pre-screen", "Compensation mismatch"),
        )
        .expect("move stored despite publisher outage");

    assert_eq!(updated.status, "rejected");
}

#[test]
fn repository_outage_is_propagated() {
    let service = HiringPipelineService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryPublisher::default()),
        RoundPlan::default(),
    );

    assert!(matches!(
        service.job_posting(&JobPostingId("job-1".to_string())),
        Err(PipelineServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}

#[test]
fn board_and_funnel_reflect_transitions() {
    let (service, _, _, posting, application) = seeded_service();
    service
        .submit_application(submission(&posting.id, "second@example.com"))
        .expect("second application");
    service
        .transition(
            &Actor::new(Role::Admin),
            &application.id,
            TransitionRequest::new("round 1", "pre-screen", "Good culture fit"),
        )
        .expect("transition");

    let client_board = service
        .board(&Actor::new(Role::Client), &posting.id)
        .expect("board builds");
    let round_one = client_board.column("round 1").expect("stage 2 column");
    assert_eq!(round_one.cards.len(), 1);
    assert!(client_board.column("pre-screen").is_none());

    let funnel = service.funnel(&posting.id).expect("funnel builds");
    assert_eq!(funnel.total, 2);
    assert_eq!(funnel.rounds[0].count, 1);
    assert_eq!(funnel.rounds[1].count, 1);
}
