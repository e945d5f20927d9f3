use axum::extract::{Extension, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use sigma_application::AuditRecord;
use sigma_domain::{AuditAction, MessageKey, Permission};
use sigma_report::{HeaderFooter, Orientation, PaperSize, ReportBuilder, ReportError, ReportOutput};
use tracing::error;

use crate::dto::AccountResponse;
use crate::error::ErrorResponse;
use crate::middleware::RequestContext;
use crate::response::ResponseEnvelope;
use crate::state::AppState;

use super::{
    PipelineResult, THIS_ACCOUNT, ensure_allowed, resolve_account_query, translate,
};

const REPORT_FAILURE_MESSAGE: &str = "Error in generating Excel file";

const EXPORT_HEADER: &[&str] = &[
    "ID",
    "Name",
    "Legal Name",
    "Server Address",
    "Expiration",
    "Plan",
    "Detail",
    "Phone",
    "Email",
    "Website",
    "Type",
    "Code",
    "Updated At",
];

const EXPORT_FIELDS: &[&str] = &[
    "id",
    "name",
    "legal_name",
    "server_address",
    "expiration",
    "plan",
    "detail",
    "phone",
    "email",
    "website",
    "type",
    "code",
    "updated_at",
];

pub async fn export_accounts_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(params): Query<Vec<(String, String)>>,
) -> PipelineResult {
    ensure_allowed(&state, &context, Permission::AccountExcel).await?;
    let query = resolve_account_query(&params)?;

    let accounts = state
        .account_service
        .excel(&context.actor, &query)
        .await
        .map_err(|error| {
            ResponseEnvelope::failure_with(
                StatusCode::NOT_FOUND,
                translate(&state, &context, MessageKey::RecordNotFound, &[]),
                &error,
            )
            .into_response()
        })?;

    state
        .audit_recorder
        .record(
            &context.actor,
            AuditRecord::new(AuditAction::AccountExcel, THIS_ACCOUNT),
        )
        .await;

    let rows = accounts
        .into_iter()
        .map(AccountResponse::from)
        .collect::<Vec<_>>();

    let output = build_account_report(&rows).map_err(|report_error| {
        error!(error = %report_error, "account report generation failed");
        ErrorResponse::respond(StatusCode::INTERNAL_SERVER_ERROR, REPORT_FAILURE_MESSAGE)
    })?;

    Ok(attachment(output))
}

fn build_account_report(rows: &[AccountResponse]) -> Result<ReportOutput, ReportError> {
    let mut report = ReportBuilder::new(THIS_ACCOUNT);
    report
        .add_sheet("Accounts")
        .add_sheet("Summary")
        .active("Accounts")
        .set_page_layout(Orientation::Landscape, PaperSize::A4)
        .set_page_margins(0.2)
        .set_header_footer(
            HeaderFooter::new()
                .header("&C&A")
                .footer("&LPrinted &D&RPage &P of &N"),
        )
        .set_column_width("B", "C", 15.3)
        .set_column_width("M", "M", 20.0)
        .active("Summary")
        .set_column_width("A", "D", 20.0)
        .active("Accounts")
        .write_header(EXPORT_HEADER)
        .set_sheet_fields(EXPORT_FIELDS)
        .write_data(rows)
        .add_table();

    report.generate()
}

fn attachment(output: ReportOutput) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", output.file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (
                HeaderName::from_static("content-description"),
                HeaderValue::from_static("File Transfer"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
        ],
        output.bytes,
    )
        .into_response()
}
