//! Built-in layout templates and template resolution.

/// Sentinel that selects a built-in template by the viewport's aspect ratio.
pub const TEMPLATE_AUTO: &str = "";

/// Default template for wide viewports: title bar, body row, centered image
/// row, footer, distributed down a column.
pub const TEMPLATE_LANDSCAPE: &str = r#"{
    "type": "div",
    "id": "root",
    "flexDirection": "column",
    "justifyContent": "space-between",
    "children": [
        {
            "type": "div",
            "id": "title",
            "flexDirection": "row",
            "padding": 10
        },
        {
            "type": "div",
            "flexDirection": "row",
            "children": [
                {
                    "id": "body",
                    "type": "text",
                    "fontSize": 1,
                    "padding": 10,
                    "flexDirection": "column",
                    "flexGrow": 1
                }
            ]
        },
        {
            "type": "div",
            "flexDirection": "row",
            "alignItems": "center",
            "justifyContent": "center",
            "children": [
                {
                    "id": "img",
                    "type": "img",
                    "flexDirection": "column",
                    "flexGrow": 2
                }
            ]
        },
        {
            "id": "footer",
            "type": "text",
            "fontSize": 1,
            "padding": 10
        }
    ]
}"#;

/// Default template for tall viewports: body and image share a row.
pub const TEMPLATE_PORTRAIT: &str = r#"{
    "type": "div",
    "id": "root",
    "flexDirection": "column",
    "justifyContent": "space-between",
    "children": [
        {
            "type": "div",
            "id": "title",
            "flexDirection": "row",
            "padding": 10
        },
        {
            "type": "div",
            "flexDirection": "row",
            "children": [
                {
                    "id": "body",
                    "type": "text",
                    "fontSize": 1,
                    "padding": 10,
                    "flexGrow": 1
                },
                {
                    "id": "img",
                    "type": "img"
                }
            ]
        },
        {
            "id": "footer",
            "type": "text",
            "fontSize": 1,
            "padding": 10
        }
    ]
}"#;

/// Resolves the auto sentinel to a built-in template for the viewport.
/// Explicit templates pass through untouched.
pub fn resolve(template: &str, width: u32, height: u32) -> &str {
    if template == TEMPLATE_AUTO {
        if width > height {
            TEMPLATE_LANDSCAPE
        } else {
            TEMPLATE_PORTRAIT
        }
    } else {
        template
    }
}
