use crate::http::response::Response;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub fn index() -> Response {
    Response::html(INDEX_HTML)
}
