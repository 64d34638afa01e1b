use crate::infra::{InMemoryPipelineRepository, TracingStageEventPublisher};
use chrono::{Duration, Local};
use clap::Args;
use hiring_board::error::AppError;
use hiring_board::workflows::hiring::{
    Actor, Application, ApplicationSubmission, Board, CandidateDetails, HiringPipelineService,
    JobPosting, NewJobPosting, PipelineServiceError, PublishError, Role, RoundPlan,
    StageChangeEvent, StageEventPublisher, TransitionRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type DemoService = HiringPipelineService<InMemoryPipelineRepository, CountingStageEventPublisher>;

/// Logs like the server publisher and counts deliveries for the demo summary.
#[derive(Debug, Default)]
struct CountingStageEventPublisher {
    inner: TracingStageEventPublisher,
    delivered: AtomicUsize,
}

impl CountingStageEventPublisher {
    fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl StageEventPublisher for CountingStageEventPublisher {
    fn publish(&self, event: StageChangeEvent) -> Result<(), PublishError> {
        self.inner.publish(event)?;
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of stage 2 interview rounds on the demo posting (1-3).
    #[arg(long)]
    pub(crate) stage_two_rounds: Option<u8>,
    /// Print each role's board as JSON instead of a text listing.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let plan = match args.stage_two_rounds {
        Some(count) => RoundPlan::new(count).map_err(PipelineServiceError::from)?,
        None => RoundPlan::default(),
    };

    let publisher = Arc::new(CountingStageEventPublisher::default());
    let service = HiringPipelineService::new(
        Arc::new(InMemoryPipelineRepository::default()),
        publisher.clone(),
        plan,
    );

    println!("Hiring board demo");
    let posting = service.create_job_posting(demo_posting())?;
    println!(
        "- Posting {} '{}' for {} with {} rounds",
        posting.id,
        posting.title,
        posting.client,
        posting.rounds.len()
    );

    let mut applications = Vec::new();
    for (first, last, email) in [
        ("Priya", "Natarajan", "priya@example.com"),
        ("Jonas", "Berg", "jonas@example.com"),
        ("Amara", "Eze", "amara@example.com"),
    ] {
        let application =
            service.submit_application(demo_submission(&posting, first, last, email))?;
        println!(
            "- {} applied -> {}",
            application.candidate.full_name(),
            application.status
        );
        applications.push(application);
    }

    let Some(first_interview) = posting
        .rounds
        .iter()
        .find(|round| round.name.starts_with("round"))
        .map(|round| round.name.clone())
    else {
        return Ok(());
    };

    println!("\nStage moves");
    let admin = Actor::with_id(Role::Admin, "recruiter-ops");
    let client = Actor::with_id(Role::Client, posting.client.clone());
    let vendor = Actor::with_id(Role::SubVendor, "vendor-northwind");

    attempt(
        &service,
        &admin,
        &applications[0],
        TransitionRequest::new(&first_interview, "pre-screen", "Good culture fit"),
    );
    attempt(
        &service,
        &vendor,
        &applications[1],
        TransitionRequest::new(&first_interview, "pre-screen", "Strong portfolio"),
    );
    attempt(
        &service,
        &client,
        &applications[1],
        TransitionRequest::new("hired", "pre-screen", "Skip the loop"),
    );
    attempt(
        &service,
        &admin,
        &applications[2],
        TransitionRequest::new("rejected", "pre-screen", "Compensation mismatch"),
    );

    for role in Role::ordered() {
        let board = service.board(&Actor::new(role), &posting.id)?;
        if args.json {
            match serde_json::to_string_pretty(&board) {
                Ok(json) => println!("\n{json}"),
                Err(err) => println!("\n{role} board unavailable: {err}"),
            }
        } else {
            render_board(&board);
        }
    }

    let funnel = service.funnel(&posting.id)?;
    println!("\nFunnel ({} applications)", funnel.total);
    for entry in &funnel.rounds {
        println!("  - {:<14} {:>2} ({:.1}%)", entry.round, entry.count, entry.share);
    }

    println!("\nPublished stage changes: {}", publisher.delivered());
    Ok(())
}

fn attempt(
    service: &DemoService,
    actor: &Actor,
    application: &Application,
    request: TransitionRequest,
) {
    let target = request.status.clone();
    match service.transition(actor, &application.id, request) {
        Ok(updated) => println!(
            "- {} moved {} -> {}",
            actor.role,
            application.candidate.full_name(),
            updated.status
        ),
        Err(err) => println!(
            "- {} could not move {} to {}: {}",
            actor.role,
            application.candidate.full_name(),
            target,
            err
        ),
    }
}

fn render_board(board: &Board) {
    let mode = if board.draggable { "drag enabled" } else { "read only" };
    println!("\n{} board ({mode})", board.viewer);
    for column in &board.columns {
        println!("  [{}] {}", column.stage, column.round);
        if let Some(placeholder) = column.placeholder {
            println!("      {placeholder}");
        }
        for card in &column.cards {
            println!(
                "      {} <{}>: {}",
                card.candidate_name, card.email, card.feedback
            );
        }
    }
}

fn demo_posting() -> NewJobPosting {
    NewJobPosting {
        title: "Platform Engineer".to_string(),
        description: "Own the build and deploy pipeline for the client's services".to_string(),
        client: "client-acme".to_string(),
        location: "Remote".to_string(),
        application_deadline: Local::now().date_naive() + Duration::days(30),
        compensation_start: 90_000,
        compensation_end: 120_000,
        stage_two_rounds: None,
        rounds: None,
    }
}

fn demo_submission(
    posting: &JobPosting,
    first: &str,
    last: &str,
    email: &str,
) -> ApplicationSubmission {
    ApplicationSubmission {
        job: posting.id.clone(),
        candidate: CandidateDetails {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: "+1 515 555 0100".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            country: "US".to_string(),
            pincode: "50309".to_string(),
            resume_url: None,
        },
        client: Some(posting.client.clone()),
        sub_vendor: Some("vendor-northwind".to_string()),
    }
}
