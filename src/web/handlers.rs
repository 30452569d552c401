use crate::{
    agri::{
        advice::{resources, ResourceLink, FEEDBACK_ACK},
        types::{YieldDefaults, CROP_YEAR_RANGE, SEASONS},
        AgriPipeline, DiseaseReport, YieldInput, YieldReport,
    },
    utils::error::AgriError,
    web::{
        extractors::{RequestId, ValidatedJson},
        AppState,
    },
    Result,
};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

/// JSON请求体（base64模式）
#[derive(Debug, Deserialize)]
pub struct DiseaseJsonRequest {
    /// Base64编码的JPEG图像（可带data URL前缀）
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackAck {
    pub message: &'static str,
}

/// 页面表单选项
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub crops: Vec<String>,
    pub states: Vec<String>,
    pub seasons: Vec<&'static str>,
    pub crop_year_min: i32,
    pub crop_year_max: i32,
    pub defaults: YieldDefaults,
    pub resources: Vec<ResourceLink>,
}

/// JSON响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
    pub request_id: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, request_id: String) -> Self {
        Self {
            success: true,
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id,
        }
    }
}

/// 下拉框与表单默认值
pub async fn options_handler(State(state): State<AppState>) -> Json<FormOptions> {
    let catalog = state.models.catalog();

    Json(FormOptions {
        crops: catalog.crops.clone(),
        states: catalog.states.clone(),
        seasons: SEASONS.to_vec(),
        crop_year_min: *CROP_YEAR_RANGE.start(),
        crop_year_max: *CROP_YEAR_RANGE.end(),
        defaults: YieldDefaults::default(),
        resources: resources(),
    })
}

/// JSON base64上传处理器
pub async fn disease_json_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedJson(request): ValidatedJson<DiseaseJsonRequest>,
) -> Result<Json<ApiResponse<DiseaseReport>>> {
    tracing::info!(
        "Processing JSON disease request: request_id={}, payload={} bytes",
        request_id,
        request.image.len()
    );

    let models = state.models.clone();
    let report = tokio::task::spawn_blocking(move || {
        AgriPipeline::classify_base64(&models, &request.image)
    })
    .await
    .map_err(|e| AgriError::Internal(format!("Classification task failed: {}", e)))??;

    Ok(Json(ApiResponse::success(report, request_id)))
}

/// Multipart文件上传处理器
pub async fn disease_upload_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<DiseaseReport>>> {
    tracing::info!("Processing multipart disease request: request_id={}", request_id);

    let mut image_data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AgriError::InvalidInput(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("unknown").to_string();

        match field_name.as_str() {
            "file" => {
                // 验证内容类型
                if let Some(content_type) = field.content_type() {
                    if !content_type.starts_with("image/") {
                        return Err(AgriError::UnsupportedFormat(content_type.to_string()));
                    }
                }

                let data = field.bytes().await.map_err(|e| {
                    AgriError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;

                if data.is_empty() {
                    return Err(AgriError::InvalidInput("Empty file".to_string()));
                }

                tracing::debug!("Received file: {} bytes", data.len());
                image_data = Some(data);
            }
            _ => {
                tracing::debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let image_data = image_data
        .ok_or_else(|| AgriError::InvalidInput("No image file provided".to_string()))?;

    let models = state.models.clone();
    let report = tokio::task::spawn_blocking(move || {
        AgriPipeline::classify_bytes(&models, &image_data)
    })
    .await
    .map_err(|e| AgriError::Internal(format!("Classification task failed: {}", e)))??;

    Ok(Json(ApiResponse::success(report, request_id)))
}

/// 产量预测处理器
pub async fn yield_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedJson(input): ValidatedJson<YieldInput>,
) -> Result<Json<ApiResponse<YieldReport>>> {
    tracing::info!(
        "Processing yield request: request_id={}, crop={}, season={}, state={}",
        request_id,
        input.crop,
        input.season,
        input.state
    );

    let models = state.models.clone();
    let report = tokio::task::spawn_blocking(move || AgriPipeline::predict_yield(&models, &input))
        .await
        .map_err(|e| AgriError::Internal(format!("Prediction task failed: {}", e)))??;

    Ok(Json(ApiResponse::success(report, request_id)))
}

/// 反馈处理器：只确认，不保存
pub async fn feedback_handler(
    RequestId(request_id): RequestId,
    ValidatedJson(request): ValidatedJson<FeedbackRequest>,
) -> Json<ApiResponse<FeedbackAck>> {
    tracing::info!(
        "Feedback received: request_id={}, length={}",
        request_id,
        request.feedback.len()
    );

    Json(ApiResponse::success(
        FeedbackAck {
            message: FEEDBACK_ACK,
        },
        request_id,
    ))
}
