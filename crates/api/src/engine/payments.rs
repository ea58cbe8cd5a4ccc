//! Payment-stage flows: planning, proof submission, verification, and
//! settlement documents.
//!
//! Stage amounts are computed once at creation from the project price at
//! that moment; a later renegotiation never touches existing stages.

use atelio_core::error::CoreError;
use atelio_core::invoice::{InvoiceData, Party};
use atelio_core::payments::{self, StageSpec};
use atelio_core::status::StageStatus;
use atelio_core::types::DbId;
use atelio_db::models::payment_stage::{PaymentStage, StageInput, SubmitProof};
use atelio_db::models::project::Project;
use atelio_db::repositories::{
    BillingProfileRepo, PaymentStageRepo, ProjectRepo, TimelineRepo, UserRepo,
};
use atelio_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Plan and insert the payment stages for a project, seeding the default
/// timeline in the same transaction.
///
/// Publishes a `StageAvailable` event for every stage whose progress gate
/// is zero (payable immediately).
pub async fn create_stages(
    state: &AppState,
    project_id: DbId,
    inputs: &[StageInput],
) -> AppResult<Vec<PaymentStage>> {
    let project = find_project(state, project_id).await?;

    let specs: Vec<StageSpec> = inputs
        .iter()
        .map(|input| StageSpec {
            name: input.name.clone(),
            percentage: input.percentage,
            required_progress: input.required_progress,
        })
        .collect();
    let plans = payments::plan_stages(project.price, &specs)?;

    let mut tx = state.pool.begin().await?;
    let stages = PaymentStageRepo::create_many_tx(&mut tx, project_id, &plans).await?;
    TimelineRepo::seed_defaults_tx(&mut tx, project_id).await?;
    tx.commit().await?;

    for stage in &stages {
        if stage.status == StageStatus::Available.as_str() {
            state.event_bus.publish(DomainEvent::StageAvailable {
                stage_id: stage.id,
                project_id,
                project_name: project.name.clone(),
                stage_name: stage.name.clone(),
                amount: stage.amount,
                client_id: project.client_id,
            });
        }
    }

    Ok(stages)
}

/// Record a proof-of-payment submission for a stage.
///
/// Only the owning client (or an admin) may submit. The proof file itself
/// is never stored; a synthesized reference ties the submission to the
/// original file name. Publishes the admin review request and the client
/// confirmation receipt.
pub async fn submit_proof(
    state: &AppState,
    stage_id: DbId,
    caller: &AuthUser,
    input: &SubmitProof,
) -> AppResult<PaymentStage> {
    let stage = find_stage(state, stage_id).await?;
    let project = find_project(state, stage.project_id).await?;
    caller.ensure_self_or_admin(project.client_id)?;

    let reference = proof_reference(stage_id, &input.file_name);
    let updated = PaymentStageRepo::submit_proof(
        &state.pool,
        stage_id,
        &input.payment_method,
        &reference,
        caller.user_id,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Payment stage",
        id: stage_id,
    }))?;

    state.event_bus.publish(DomainEvent::StageProofSubmitted {
        stage_id,
        project_name: project.name.clone(),
        stage_name: updated.name.clone(),
        amount: updated.amount,
        client_id: project.client_id,
        method: input.payment_method.clone(),
    });
    state.event_bus.publish(DomainEvent::StageProofReceipt {
        stage_id,
        project_name: project.name,
        stage_name: updated.name.clone(),
        client_id: project.client_id,
    });

    Ok(updated)
}

/// Approve a stage awaiting verification, marking it paid.
///
/// The repository update is conditional on `pending_verification`; when it
/// matches no row the stage is either missing (404) or in the wrong state
/// (400), decided by a follow-up lookup.
pub async fn approve_stage(
    state: &AppState,
    stage_id: DbId,
    approver_id: DbId,
) -> AppResult<PaymentStage> {
    let Some(stage) = PaymentStageRepo::approve(&state.pool, stage_id, approver_id).await? else {
        return Err(stage_not_verifiable(state, stage_id).await);
    };

    let project = find_project(state, stage.project_id).await?;
    state.event_bus.publish(DomainEvent::StageApproved {
        stage_id,
        project_name: project.name,
        stage_name: stage.name.clone(),
        amount: stage.amount,
        client_id: project.client_id,
    });

    Ok(stage)
}

/// Reject a submitted proof, returning the stage to `available`.
///
/// The proof reference and payment method are cleared so the client can
/// try again; the rejection itself is preserved in the stage metadata.
pub async fn reject_stage(
    state: &AppState,
    stage_id: DbId,
    rejected_by: DbId,
    reason: &str,
) -> AppResult<PaymentStage> {
    let Some(stage) =
        PaymentStageRepo::reject(&state.pool, stage_id, rejected_by, reason).await?
    else {
        return Err(stage_not_verifiable(state, stage_id).await);
    };

    let project = find_project(state, stage.project_id).await?;
    state.event_bus.publish(DomainEvent::StageRejected {
        stage_id,
        project_name: project.name,
        stage_name: stage.name.clone(),
        client_id: project.client_id,
        reason: reason.to_string(),
    });

    Ok(stage)
}

/// Assemble the settlement document for a paid stage.
///
/// Returns the document data plus its deterministic download file name.
/// Only the owning client or an admin may download.
pub async fn settlement_document(
    state: &AppState,
    stage_id: DbId,
    caller: &AuthUser,
) -> AppResult<(InvoiceData, String)> {
    let stage = find_stage(state, stage_id).await?;
    let project = find_project(state, stage.project_id).await?;
    caller.ensure_self_or_admin(project.client_id)?;

    payments::ensure_paid(StageStatus::parse(&stage.status)?)?;

    // Stage numbering follows the delivery order (ascending progress gate).
    let siblings = PaymentStageRepo::list_for_project(&state.pool, project.id).await?;
    let ordered: Vec<(DbId, i32)> = siblings
        .iter()
        .map(|s| (s.id, s.required_progress))
        .collect();
    let (position, total_stages) = payments::stage_position(&ordered, stage_id)?;

    let billee = billee_party(state, project.client_id).await?;
    let issued_at = stage.paid_at.unwrap_or_else(chrono::Utc::now);

    let invoice = InvoiceData::build(
        project.id,
        project.name,
        stage.name,
        stage.amount,
        position,
        total_stages,
        billee,
        issued_at,
    );
    let file_name = invoice.file_name(project.id);

    Ok((invoice, file_name))
}

/// Build the billee block from the client's billing profile, falling back
/// to the account name when no profile exists.
async fn billee_party(state: &AppState, client_id: DbId) -> AppResult<Party> {
    let user = UserRepo::find_by_id(&state.pool, client_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: client_id,
        }))?;

    let profile = BillingProfileRepo::find_by_user(&state.pool, client_id).await?;
    Ok(match profile {
        Some(p) => Party {
            name: p.company_name,
            tax_id: p.tax_id,
            address: p.address,
        },
        None => Party {
            name: user.full_name,
            tax_id: None,
            address: None,
        },
    })
}

/// Synthesized proof reference: stage id, submission timestamp, and the
/// original file name.
pub fn proof_reference(stage_id: DbId, file_name: &str) -> String {
    format!(
        "proof-{stage_id}-{}-{file_name}",
        chrono::Utc::now().timestamp()
    )
}

/// Distinguish "stage missing" from "stage in the wrong state" after a
/// conditional update matched nothing.
async fn stage_not_verifiable(state: &AppState, stage_id: DbId) -> AppError {
    match PaymentStageRepo::find_by_id(&state.pool, stage_id).await {
        Ok(Some(stage)) => {
            let err = StageStatus::parse(&stage.status)
                .and_then(payments::ensure_pending_verification)
                .err()
                // A resubmission can slip in between the failed conditional
                // update and this lookup; still a state conflict.
                .unwrap_or_else(|| {
                    CoreError::InvalidState(
                        "Stage verification raced a concurrent submission".into(),
                    )
                });
            AppError::Core(err)
        }
        Ok(None) => AppError::Core(CoreError::NotFound {
            entity: "Payment stage",
            id: stage_id,
        }),
        Err(e) => AppError::Database(e),
    }
}

async fn find_project(state: &AppState, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}

async fn find_stage(state: &AppState, stage_id: DbId) -> AppResult<PaymentStage> {
    PaymentStageRepo::find_by_id(&state.pool, stage_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Payment stage",
            id: stage_id,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_reference_embeds_stage_and_file() {
        let reference = proof_reference(17, "transfer.pdf");
        assert!(reference.starts_with("proof-17-"));
        assert!(reference.ends_with("-transfer.pdf"));
    }
}
