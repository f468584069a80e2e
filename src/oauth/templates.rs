//! HTML pages for the popup window opened by the CMS

use super::types::PROVIDER;

const PAGE_STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f6f8; color: #1f2933; display: flex; align-items: center; justify-content: center; min-height: 100vh; margin: 0; }
    .card { background: #fff; border-radius: 8px; box-shadow: 0 2px 12px rgba(0,0,0,.08); padding: 2rem 2.5rem; max-width: 28rem; text-align: center; }
    h1 { font-size: 1.25rem; margin: 0 0 1rem; }
    p { line-height: 1.5; margin: .5rem 0; }
    .muted { color: #616e7c; font-size: .875rem; }
    code { background: #f0f2f5; border-radius: 4px; padding: .1rem .3rem; }
"#;

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        html_escape(title),
        PAGE_STYLE,
        body
    )
}

/// Page that hands the token to the window that opened it
///
/// The script answers the opener's `authorizing:github` handshake once:
/// the listener is removed before the token is posted, so a second
/// handshake gets nothing. Only the opener is answered, at the origin it
/// sent the handshake from.
pub fn render_success_page(token: &str, username: &str, permission: Option<&str>) -> String {
    let content = serde_json::json!({ "token": token, "provider": PROVIDER });
    let message = format!("authorization:{}:success:{}", PROVIDER, content);

    let body = format!(
        r#"<div class="card">
<h1>Signed in</h1>
<p>Signed in as <strong>{username}</strong>. Returning you to the admin panel.</p>
{permission_line}</div>
<script>
(function () {{
  var handshake = {handshake};
  var message = {message};
  function receive(event) {{
    if (event.data !== handshake || event.source !== window.opener) {{
      return;
    }}
    window.removeEventListener("message", receive, false);
    window.opener.postMessage(message, event.origin);
  }}
  window.addEventListener("message", receive, false);
  if (window.opener) {{
    window.opener.postMessage(handshake, "*");
  }}
}})();
</script>"#,
        username = html_escape(username),
        permission_line = permission_line(permission),
        handshake = script_string(&format!("authorizing:{}", PROVIDER)),
        message = script_string(&message),
    );

    html_page("Signed in", &body)
}

/// Page shown when the user is not allowed into the admin panel
pub fn render_denied_page(username: &str, permission: Option<&str>, reason: &str) -> String {
    let body = format!(
        "<div class=\"card\">\n<h1>Access denied</h1>\n\
         <p>Signed in as <strong>{}</strong>.</p>\n<p>{}</p>\n{}\
         <p class=\"muted\">Ask a repository administrator for write access, then try again.</p>\n</div>",
        html_escape(username),
        html_escape(reason),
        permission_line(permission)
    );

    html_page("Access denied", &body)
}

/// Page shown when the flow fails
pub fn render_error_page(message: &str) -> String {
    let body = format!(
        "<div class=\"card\">\n<h1>Sign-in failed</h1>\n<p>{}</p>\n\
         <p class=\"muted\">Close this window and try again.</p>\n</div>",
        html_escape(message)
    );

    html_page("Sign-in failed", &body)
}

fn permission_line(permission: Option<&str>) -> String {
    match permission {
        Some(p) => format!(
            "<p class=\"muted\">Current permission: <code>{}</code></p>\n",
            html_escape(p)
        ),
        None => String::new(),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JavaScript string literal that cannot terminate the surrounding script element
fn script_string(s: &str) -> String {
    serde_json::Value::from(s)
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
