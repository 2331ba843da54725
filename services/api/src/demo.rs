use crate::infra::{in_memory_engine, MemoryPlacementEngine};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use internship_placement::error::AppError;
use internship_placement::workflows::placement::{
    FixedClock, InternshipLevel, Major, Opportunity, OpportunityDraft, OpportunityFilter,
    PlacementPolicy, RepresentativeId, RepresentativeProfile, StaffId, StudentId, StudentProfile,
    WithdrawalDecision,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the walkthrough runs on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Stop after the placement is accepted instead of withdrawing it again.
    #[arg(long)]
    pub(crate) skip_withdrawal: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_withdrawal,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let (engine, notices) =
        in_memory_engine(PlacementPolicy::default(), Arc::new(FixedClock(today)));
    let representative = RepresentativeProfile {
        id: RepresentativeId::from("rep-nova"),
        company_name: "Nova Systems".to_string(),
    };
    let staff = StaffId::from("career-office");
    let student = demo_student("U2300001A", "Priya Raman");
    let latecomer = demo_student("U2300002B", "Marcus Lee");

    println!("Internship placement demo ({today})");

    let firmware = publish(
        &engine,
        &representative,
        &staff,
        demo_draft("Embedded Firmware Intern", 1, today),
    )?;
    let tooling = publish(
        &engine,
        &representative,
        &staff,
        demo_draft("Developer Tooling Intern", 2, today),
    )?;
    println!(
        "- {} published {} ({} slot) and {} ({} slots)",
        representative.company_name,
        firmware.id,
        firmware.total_slots,
        tooling.id,
        tooling.total_slots
    );

    let available = engine.available_opportunities(&student)?;
    println!("\nListings visible to {}:", student.name);
    for listing in &available {
        println!(
            "  - {} {} [{}] {} of {} slots open",
            listing.id,
            listing.title,
            listing.level.label(),
            listing.available_slots(),
            listing.total_slots
        );
    }

    let first = engine.apply(&student, &firmware.id)?;
    let second = engine.apply(&student, &tooling.id)?;
    println!(
        "\n- {} applied: {} -> {}, {} -> {}",
        student.name, first.id, firmware.id, second.id, tooling.id
    );

    engine.approve_application(&representative.id, &first.id)?;
    engine.approve_application(&representative.id, &second.id)?;
    println!("- {} offered both positions", representative.company_name);

    let acceptance = engine.accept_placement(&student.id, &first.id)?;
    println!(
        "- {} accepted {}; listing now {} ({}/{} filled)",
        student.name,
        acceptance.opportunity.id,
        acceptance.opportunity.status.label(),
        acceptance.opportunity.filled_slots,
        acceptance.opportunity.total_slots
    );
    for withdrawn in &acceptance.withdrawn {
        println!("  Automatically withdrew {withdrawn}");
    }

    match engine.apply(&latecomer, &firmware.id) {
        Ok(application) => println!("- {} applied as {}", latecomer.name, application.id),
        Err(err) => println!(
            "- {} could not apply to {}: {}",
            latecomer.name, firmware.id, err
        ),
    }

    if !skip_withdrawal {
        let request = engine.request_withdrawal(
            &student.id,
            &first.id,
            "Accepted a research assistantship".to_string(),
        )?;
        let outcome = engine.decide_withdrawal(
            &staff,
            &request.id,
            WithdrawalDecision::Approve,
            "Approved after advisor review".to_string(),
        )?;
        let reopened = engine.opportunity(&firmware.id)?;
        println!(
            "\n- Withdrawal {} {} (slot released: {}); {} is {} again",
            outcome.request.id,
            outcome.request.status.label(),
            outcome.released_slot,
            reopened.id,
            reopened.status.label()
        );
        let retry = engine.apply(&latecomer, &firmware.id)?;
        println!("- {} applied as {}", latecomer.name, retry.id);
    }

    let report = engine.opportunity_report(&OpportunityFilter::default())?;
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("\nOpportunity report:\n{}", json),
        Err(err) => println!("\nOpportunity report unavailable: {}", err),
    }

    let events = notices.drain();
    if events.is_empty() {
        println!("Notices: none dispatched");
    } else {
        println!("Notices:");
        for notice in events {
            println!(
                "  - template={} -> {} ({})",
                notice.template, notice.recipient, notice.subject
            );
        }
    }

    Ok(())
}

fn publish(
    engine: &MemoryPlacementEngine,
    representative: &RepresentativeProfile,
    staff: &StaffId,
    draft: OpportunityDraft,
) -> Result<Opportunity, AppError> {
    let created = engine.create_opportunity(representative, draft)?;
    engine.approve_opportunity(staff, &created.id)?;
    Ok(engine.toggle_visibility(&representative.id, &created.id)?)
}

fn demo_student(id: &str, name: &str) -> StudentProfile {
    StudentProfile {
        id: StudentId::from(id),
        name: name.to_string(),
        year_of_study: 2,
        major: Major::Cs,
    }
}

fn demo_draft(title: &str, total_slots: u8, today: NaiveDate) -> OpportunityDraft {
    OpportunityDraft {
        title: title.to_string(),
        description: "Summer internship with the platform team".to_string(),
        level: InternshipLevel::Basic,
        preferred_major: Major::Cs,
        opening_date: today - Duration::days(7),
        closing_date: today + Duration::days(30),
        total_slots,
    }
}
