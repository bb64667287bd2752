use std::any::Any;

/// Best-effort human readable text for a panic payload.
///
/// `panic!` with a literal produces `&'static str`, with format arguments a
/// `String`. Anything else (e.g. `panic_any(MyError)`) has no generic text.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Box<dyn Any>"
    }
}
