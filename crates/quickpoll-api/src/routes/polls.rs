use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use quickpoll_core::poll::{CreatePollInput, PollListQuery};
use quickpoll_core::AppState;
use quickpoll_models::SortBy;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
}

pub async fn create_poll(
    State(state): State<AppState>,
    payload: Result<Json<CreatePollRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;

    let poll_id = quickpoll_core::poll::create_poll(
        &state.store,
        CreatePollInput {
            name: body.name.unwrap_or_default(),
            category: body.category,
            description: body.description,
            question: body.question.unwrap_or_default(),
            options: body.options.unwrap_or_default(),
        },
    )
    .await?;

    Ok(Json(json!({ "success": true, "pollId": poll_id })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPollsParams {
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
}

pub async fn list_polls(
    State(state): State<AppState>,
    params: Result<Query<ListPollsParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;

    let query = PollListQuery {
        category: params.category,
        search: params.search,
        sort_by: params
            .sort_by
            .as_deref()
            .map(SortBy::parse)
            .unwrap_or_default(),
        page: parse_number(params.page.as_deref()),
        limit: parse_number(params.limit.as_deref()),
    };

    let page =
        quickpoll_core::poll::list_polls(&state.store, state.config.page_limits, query).await?;

    Ok(Json(json!({
        "success": true,
        "polls": page.polls,
        "pagination": page.pagination,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPollParams {
    pub poll_id: Option<String>,
    pub register_view: Option<String>,
}

pub async fn view_poll(
    State(state): State<AppState>,
    params: Result<Query<ViewPollParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    // Only the exact string "true" registers a view; background refreshes
    // omit the flag.
    let register_view = params.register_view.as_deref() == Some("true");
    let poll_id = params.poll_id.unwrap_or_default();

    let poll =
        quickpoll_core::poll::get_poll_with_options(&state.store, &poll_id, register_view).await?;

    Ok(Json(json!({ "success": true, "poll": poll })))
}

/// Clients send the option id either as a number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OptionIdParam {
    Number(i64),
    Text(String),
}

impl OptionIdParam {
    fn into_string(self) -> String {
        match self {
            OptionIdParam::Number(n) => n.to_string(),
            OptionIdParam::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVoteRequest {
    pub poll_id: Option<String>,
    pub option_id: Option<OptionIdParam>,
}

pub async fn register_vote(
    State(state): State<AppState>,
    payload: Result<Json<RegisterVoteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let poll_id = body.poll_id.unwrap_or_default();
    let option_id = body
        .option_id
        .map(OptionIdParam::into_string)
        .unwrap_or_default();

    quickpoll_core::poll::register_vote(&state.store, &poll_id, &option_id).await?;

    Ok(Json(json!({ "success": true })))
}
