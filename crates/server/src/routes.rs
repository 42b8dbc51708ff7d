//! HTTP routes over the cell store and the table engines.

use crate::error::{ApiError, ApiResult};
use crate::store::CellStore;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cellgrid_analysis::{
    run_analysis, AnalysisOutput, AnalysisRequest, AnalysisType, ChartConfig, ChartData, ChartType,
    RequestError,
};
use cellgrid_sheet::{
    cells_to_table, export_csv, export_excel, import_upload_sheet, list_excel_sheets,
    table_to_cells, validate_upload, ContainerId, DataType, FileKind, SparseCell, Table,
    UploadPolicy,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Room for multipart framing on top of the upload limit, so an oversize
/// file reaches the upload check and gets a proper error body.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CellStore>,
    pub upload: UploadPolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn CellStore>, upload: UploadPolicy) -> Self {
        AppState { store, upload }
    }

    async fn load_table(&self, container: &ContainerId) -> ApiResult<Table> {
        let cells = self.store.list_cells(container).await?;
        Ok(cells_to_table(&cells))
    }

    /// Like `load_table`, but an empty table is rejected
    async fn load_data(&self, container: &ContainerId) -> ApiResult<Table> {
        let table = self.load_table(container).await?;
        if table.is_empty() {
            return Err(RequestError::EmptyTable.into());
        }
        Ok(table)
    }
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ContainerKind {
    Worksheet,
    Spreadsheet,
}

impl ContainerKind {
    fn with_id(self, id: String) -> ContainerId {
        match self {
            ContainerKind::Worksheet => ContainerId::Worksheet(id),
            ContainerKind::Spreadsheet => ContainerId::Spreadsheet(id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContainerPath {
    kind: ContainerKind,
    id: String,
}

impl ContainerPath {
    fn container(self) -> ContainerId {
        self.kind.with_id(self.id)
    }
}

/// Build the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.upload.max_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health))
        .route("/workbooks/sheets", post(list_sheets))
        .route("/containers/:kind", post(create_container))
        .route("/containers/:kind/:id/import", post(import_file))
        .route("/containers/:kind/:id/export.csv", get(export_csv_file))
        .route("/containers/:kind/:id/export.xlsx", get(export_xlsx_file))
        .route(
            "/containers/:kind/:id/cells",
            get(list_cells).put(put_cells).delete(clear_cells),
        )
        .route("/containers/:kind/:id/analysis", post(analyze))
        .route("/containers/:kind/:id/formula", post(evaluate_formula))
        .route("/containers/:kind/:id/chart", post(chart))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn create_container(
    State(state): State<AppState>,
    Path(kind): Path<ContainerKind>,
) -> ApiResult<impl IntoResponse> {
    let container = kind.with_id(Uuid::new_v4().to_string());
    state.store.create(&container).await?;
    tracing::info!(%container, "Created container");
    Ok((StatusCode::CREATED, Json(container)))
}

/// A file pulled out of a multipart form, plus the optional sheet choice
struct Upload {
    filename: String,
    bytes: Bytes,
    sheet_name: Option<String>,
}

fn bad_multipart(err: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {err}"))
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    let mut file = None;
    let mut sheet_name = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((filename, bytes));
            }
            Some("sheet_name") => {
                sheet_name = Some(field.text().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    Ok(Upload {
        filename,
        bytes,
        sheet_name,
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct ImportSummary {
    rows: usize,
    columns: usize,
    headers: Option<Vec<String>>,
    sheet: Option<String>,
}

async fn import_file(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    multipart: Multipart,
) -> ApiResult<Json<ImportSummary>> {
    let container = path.container();
    let upload = read_upload(multipart).await?;
    let (sheet, table) = import_upload_sheet(
        &upload.filename,
        &upload.bytes,
        upload.sheet_name.as_deref(),
        state.upload,
    )?;

    let written = state
        .store
        .replace_cells(&container, table_to_cells(&table, &container))
        .await?;

    tracing::info!(
        %container,
        file = %upload.filename,
        rows = table.row_count(),
        columns = table.col_count(),
        cells = written,
        "Imported file"
    );

    Ok(Json(ImportSummary {
        rows: table.row_count(),
        columns: table.col_count(),
        headers: table.headers().map(<[String]>::to_vec),
        sheet,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
struct SheetList {
    sheets: Vec<String>,
}

async fn list_sheets(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Json<SheetList>> {
    let upload = read_upload(multipart).await?;
    match validate_upload(&upload.filename, &upload.bytes, state.upload)? {
        FileKind::Xlsx => Ok(Json(SheetList {
            sheets: list_excel_sheets(&upload.bytes)?,
        })),
        _ => Err(ApiError::BadRequest(format!(
            "{} is not an xlsx workbook",
            upload.filename
        ))),
    }
}

fn download(kind: FileKind, filename: String, bytes: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
}

async fn export_csv_file(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
) -> ApiResult<impl IntoResponse> {
    let filename = format!("{}.csv", path.id);
    let table = state.load_table(&path.container()).await?;
    Ok(download(FileKind::Csv, filename, export_csv(&table)?))
}

async fn export_xlsx_file(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
) -> ApiResult<impl IntoResponse> {
    let filename = format!("{}.xlsx", path.id);
    let table = state.load_table(&path.container()).await?;
    Ok(download(FileKind::Xlsx, filename, export_excel(&table)?))
}

async fn list_cells(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
) -> ApiResult<Json<Vec<SparseCell>>> {
    Ok(Json(state.store.list_cells(&path.container()).await?))
}

/// Body item for `PUT .../cells`; the container comes from the path
#[derive(Debug, Deserialize)]
struct CellInput {
    row_index: usize,
    column_index: usize,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    data_type: DataType,
}

#[derive(Debug, Serialize, Deserialize)]
struct UpdateSummary {
    updated: usize,
}

async fn put_cells(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    Json(inputs): Json<Vec<CellInput>>,
) -> ApiResult<Json<UpdateSummary>> {
    let container = path.container();
    let cells = inputs
        .into_iter()
        .map(|input| SparseCell {
            container: container.clone(),
            row_index: input.row_index,
            column_index: input.column_index,
            value: input.value,
            data_type: input.data_type,
        })
        .collect();

    let updated = state.store.upsert_cells(&container, cells).await?;
    Ok(Json(UpdateSummary { updated }))
}

async fn clear_cells(State(state): State<AppState>, Path(path): Path<ContainerPath>) -> ApiResult<StatusCode> {
    state.store.clear(&path.container()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    analysis_type: AnalysisType,
    selected_columns: Vec<usize>,
    results: AnalysisOutput,
}

async fn analyze(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let table = state.load_data(&path.container()).await?;
    request.validate(&table)?;
    let results = run_analysis(&table, &request)?;

    Ok(Json(AnalysisResponse {
        analysis_type: request.analysis_type,
        selected_columns: request.selected_columns,
        results,
    }))
}

#[derive(Debug, Deserialize)]
struct FormulaRequest {
    formula: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FormulaResponse {
    formula: String,
    result: Option<f64>,
}

async fn evaluate_formula(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    Json(request): Json<FormulaRequest>,
) -> ApiResult<Json<FormulaResponse>> {
    let table = state.load_table(&path.container()).await?;
    let result = cellgrid_formulas::evaluate(&request.formula, &table);
    Ok(Json(FormulaResponse {
        formula: request.formula,
        result,
    }))
}

#[derive(Debug, Serialize)]
struct ChartResponse {
    chart_type: ChartType,
    title: String,
    #[serde(flatten)]
    data: ChartData,
}

async fn chart(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    Json(config): Json<ChartConfig>,
) -> ApiResult<Json<ChartResponse>> {
    let table = state.load_data(&path.container()).await?;
    let data = config.data(&table)?;
    Ok(Json(ChartResponse {
        chart_type: config.chart_type,
        title: config.title,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::{body::Body, http::Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "cellgrid-test-boundary";

    fn test_app(policy: UploadPolicy) -> Router {
        create_router(AppState::new(Arc::new(MemoryStore::new()), policy))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = send(app, request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn multipart(filename: &str, bytes: &[u8], sheet_name: Option<&str>) -> Body {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
        if let Some(name) = sheet_name {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"sheet_name\"\r\n\r\n{name}\r\n")
                    .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn upload_request(uri: &str, filename: &str, bytes: &[u8], sheet_name: Option<&str>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart(filename, bytes, sheet_name))
            .unwrap()
    }

    /// Create a worksheet and return its base path
    async fn new_worksheet(app: &Router) -> String {
        let (status, body) = send_json(app, "POST", "/containers/worksheet", Value::Null).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["kind"], "worksheet");
        format!("/containers/worksheet/{}", body["id"].as_str().unwrap())
    }

    async fn import(app: &Router, base: &str, filename: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let (status, body) = send(app, upload_request(&format!("{base}/import"), filename, bytes, None)).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app(UploadPolicy::default());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        let health: Health = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let app = test_app(UploadPolicy::default());
        let request = Request::builder().uri("/nonexistent").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_container_is_404() {
        let app = test_app(UploadPolicy::default());
        let (status, body) = send_json(&app, "GET", "/containers/worksheet/missing/cells", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("worksheet:missing"));
    }

    #[tokio::test]
    async fn test_csv_import_then_cells_and_export() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;

        let (status, summary) = import(&app, &base, "people.csv", b"name,age\nAlice,30\nBob,25\n").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary, json!({"rows": 2, "columns": 2, "headers": ["name", "age"], "sheet": null}));

        let (status, cells) = send_json(&app, "GET", &format!("{base}/cells"), Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cells.as_array().unwrap().len(), 4);
        assert_eq!(cells[1]["value"], "30");
        assert_eq!(cells[1]["data_type"], "number");

        let request = Request::builder().uri(format!("{base}/export.csv")).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Alice,30\nBob,25\n");
    }

    #[tokio::test]
    async fn test_xlsx_import_picks_named_sheet() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;

        let workbook = export_excel(&Table::from_data(vec![vec!["k", "v"], vec!["a", "1"]])).unwrap();
        let request = upload_request(&format!("{base}/import"), "book.xlsx", &workbook, Some("Sheet1"));
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let summary: ImportSummary = serde_json::from_slice(&body).unwrap();
        assert_eq!(summary.sheet.as_deref(), Some("Sheet1"));
        assert_eq!((summary.rows, summary.columns), (1, 2));

        let request = upload_request(&format!("{base}/import"), "book.xlsx", &workbook, Some("Nope"));
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = upload_request("/workbooks/sheets", "book.xlsx", &workbook, None);
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let sheets: SheetList = serde_json::from_slice(&body).unwrap();
        assert_eq!(sheets.sheets, vec!["Sheet1"]);
    }

    #[tokio::test]
    async fn test_xlsx_export_round_trips() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;
        import(&app, &base, "d.csv", b"a,b\n1,x\n2,y\n").await;

        let request = Request::builder().uri(format!("{base}/export.xlsx")).body(Body::empty()).unwrap();
        let (status, bytes) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let table = cellgrid_sheet::import_excel(&bytes, None).unwrap();
        // The first exported row is read back as headers
        assert_eq!(table.headers().unwrap(), ["1", "x"]);
        assert_eq!(table.row_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let app = test_app(UploadPolicy::default().with_max_bytes(16));
        let base = new_worksheet(&app).await;

        let (status, body) = import(&app, &base, "big.csv", &[b'a'; 64]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());

        let (status, _) = import(&app, &base, "notes.txt", b"a,b\n1,2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = import(&app, &base, "empty.csv", b"").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = import(&app, "/containers/worksheet/missing", "d.csv", b"a\n1\n").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_cells_then_formula() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;

        let cells = json!([
            {"row_index": 0, "column_index": 0, "value": "1"},
            {"row_index": 1, "column_index": 0, "value": "2", "data_type": "number"},
            {"row_index": 2, "column_index": 0, "value": "3"}
        ]);
        let (status, body) = send_json(&app, "PUT", &format!("{base}/cells"), cells).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], 3);

        let uri = format!("{base}/formula");
        let (_, body) = send_json(&app, "POST", &uri, json!({"formula": "=SUM(A1:A3)"})).await;
        assert_eq!(body["result"], 6.0);
        let (_, body) = send_json(&app, "POST", &uri, json!({"formula": "=AVG(A1:A3)"})).await;
        assert_eq!(body["result"], 2.0);
        let (status, body) = send_json(&app, "POST", &uri, json!({"formula": "=FOO(A1:A3)"})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn test_analysis_endpoint() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;
        import(&app, &base, "d.csv", b"x,y\n1,2\n2,4\n3,6\n4,8\n").await;
        let uri = format!("{base}/analysis");

        let (status, body) = send_json(
            &app,
            "POST",
            &uri,
            json!({"analysis_type": "regression", "selected_columns": [0, 1],
                   "parameters": {"x_column": 0, "y_column": 1}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis_type"], "regression");
        assert_eq!(body["results"]["equation"], "y = 2.0000x + 0.0000");

        let (status, body) =
            send_json(&app, "POST", &uri, json!({"analysis_type": "summary_stats", "selected_columns": [0]})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["0"]["mean"], 2.5);

        let (status, body) =
            send_json(&app, "POST", &uri, json!({"analysis_type": "correlation", "selected_columns": [0]})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Correlation requires at least 2 columns"));

        let (status, body) = send_json(
            &app,
            "POST",
            &uri,
            json!({"analysis_type": "regression", "selected_columns": [],
                   "parameters": {"x_column": 0, "y_column": 9}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("out of range"));
    }

    #[tokio::test]
    async fn test_empty_container_is_rejected_for_analysis() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;
        let (status, body) = send_json(
            &app,
            "POST",
            &format!("{base}/analysis"),
            json!({"analysis_type": "summary_stats", "selected_columns": [0]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Spreadsheet is empty");
    }

    #[tokio::test]
    async fn test_chart_endpoint() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;
        import(&app, &base, "d.csv", b"month,sales\nJan,10\nFeb,oops\n").await;

        let (status, body) = send_json(
            &app,
            "POST",
            &format!("{base}/chart"),
            json!({"chart_type": "line", "title": "Sales", "x_axis_column": 0, "y_axis_columns": [1]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chart_type"], "line");
        assert_eq!(body["labels"], json!(["Jan", "Feb"]));
        assert_eq!(body["datasets"][0], json!({"label": "Column 1", "data": [10.0, 0.0]}));
    }

    #[tokio::test]
    async fn test_clear_cells() {
        let app = test_app(UploadPolicy::default());
        let base = new_worksheet(&app).await;
        import(&app, &base, "d.csv", b"a\n1\n").await;

        let (status, _) = send_json(&app, "DELETE", &format!("{base}/cells"), Value::Null).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, cells) = send_json(&app, "GET", &format!("{base}/cells"), Value::Null).await;
        assert_eq!(cells, json!([]));
    }
}
