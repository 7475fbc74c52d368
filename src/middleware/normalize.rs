use axum::{
    extract::Request,
    http::{uri::PathAndQuery, Uri},
    middleware::Next,
    response::Response,
};

/// Rewrites bracket/JSON-array-shaped query parameters into the flat
/// repeated-key form the extractors expect, so `range=[0,9]` and
/// `range=0&range=9` are equivalent inputs. Runs before routing;
/// already-flat queries pass through unchanged.
pub async fn flatten_query_params(mut request: Request, next: Next) -> Response {
    if let Some(query) = request.uri().query() {
        let flattened = flatten_query(query);
        if flattened != query {
            let path = request.uri().path();
            let path_and_query = if flattened.is_empty() {
                path.to_string()
            } else {
                format!("{}?{}", path, flattened)
            };
            // A query that fails to re-parse is left untouched
            if let Ok(path_and_query) = path_and_query.parse::<PathAndQuery>() {
                let mut parts = request.uri().clone().into_parts();
                parts.path_and_query = Some(path_and_query);
                if let Ok(uri) = Uri::from_parts(parts) {
                    *request.uri_mut() = uri;
                }
            }
        }
    }
    next.run(request).await
}

/// For each key/value pair: strip surrounding brackets, split on commas,
/// strip surrounding quotes from each token, re-emit as repeated pairs.
pub fn flatten_query(query: &str) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let unbracketed = value.trim_matches(|c| c == '[' || c == ']');
        for entry in unbracketed.split(',') {
            serializer.append_pair(&key, entry.trim_matches('"'));
        }
    }
    serializer.finish()
}
