//! GraphQL endpoint and explorer.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::middleware::OptionalViewer;
use crate::state::AppState;

/// Execute a GraphQL request, attaching the viewer when the bearer token
/// verified.
pub async fn graphql_handler(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(viewer) = viewer {
        request = request.data(viewer);
    }

    state.schema().execute(request).await.into()
}

/// Serve the GraphiQL explorer.
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
