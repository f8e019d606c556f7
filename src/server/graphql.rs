// GraphQL endpoint handlers
// POST executes a request, GET serves GraphiQL when enabled

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::engine::graphql::HeroSchema;

// GraphQL handler
pub async fn graphql_handler(
    State(schema): State<HeroSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

// GraphiQL interface
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
