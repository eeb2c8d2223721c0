//! The self-contained HTML page served for a share.

use crate::snapshot::ShareSnapshot;

/// Render the share page for a snapshot.
///
/// Everything is inlined - styles and the copy-button script - so the
/// page works with no further requests. Optional fields (URL, notes) are
/// omitted when empty.
pub(crate) fn render(snapshot: &ShareSnapshot) -> String {
    let title = escape_html(&snapshot.title);
    let timestamp = escape_html(&snapshot.timestamp);
    let username = escape_html(&snapshot.username);
    let password = escape_html(&snapshot.password);

    let mut groups = String::new();
    groups.push_str(&field_group("Username", "username", &username));
    groups.push_str(&field_group("Password", "password", &password));

    if !snapshot.url.is_empty() {
        let url = escape_html(&snapshot.url);
        groups.push_str(&format!(
            r#"        <div class="info-group">
            <span class="label">Login URL</span>
            <a href="{url}" class="url-link" target="_blank" rel="noopener" id="url">{url}</a>
            <button class="copy-btn" onclick="copyText('url')">Copy</button>
        </div>
"#
        ));
    }

    if !snapshot.notes.is_empty() {
        let notes = escape_html(&snapshot.notes);
        groups.push_str(&format!(
            r#"        <div class="info-group">
            <span class="label">Notes</span>
            <div class="notes">{notes}</div>
        </div>
"#
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Shared credential</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
            background-color: #f5f5f5;
            color: #333;
            line-height: 1.6;
            padding: 20px;
            max-width: 600px;
            margin: 0 auto;
        }}
        .container {{
            background-color: white;
            border-radius: 12px;
            box-shadow: 0 2px 12px rgba(0,0,0,0.1);
            padding: 24px;
            margin-top: 20px;
        }}
        .header {{
            text-align: center;
            margin-bottom: 24px;
            padding-bottom: 16px;
            border-bottom: 2px solid #f0f0f0;
        }}
        .header h1 {{ color: #2196f3; font-size: 24px; margin-bottom: 8px; }}
        .header .timestamp {{ color: #757575; font-size: 14px; }}
        .info-group {{
            background-color: #f8f9fa;
            border-radius: 8px;
            padding: 16px;
            margin-bottom: 16px;
            position: relative;
        }}
        .info-group:hover {{ background-color: #f0f7ff; }}
        .label {{ font-weight: 600; color: #2c3e50; margin-bottom: 8px; display: block; }}
        .value {{ color: #34495e; word-break: break-all; padding-right: 40px; }}
        .copy-btn {{
            position: absolute;
            right: 12px;
            top: 50%;
            transform: translateY(-50%);
            background-color: #2196f3;
            color: white;
            border: none;
            border-radius: 4px;
            padding: 6px 12px;
            font-size: 13px;
            cursor: pointer;
        }}
        .copy-btn:hover {{ background-color: #1976d2; }}
        .copy-btn.copied {{ background-color: #4caf50; }}
        .url-link {{ color: #2196f3; text-decoration: none; word-break: break-all; }}
        .url-link:hover {{ text-decoration: underline; }}
        .notes {{ white-space: pre-wrap; color: #34495e; }}
        .footer {{ text-align: center; color: #9e9e9e; font-size: 13px; margin-top: 8px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{title}</h1>
            <div class="timestamp">Shared at {timestamp}</div>
        </div>
{groups}        <div class="footer">
            Shared credential page - do not forward on public networks
        </div>
    </div>
    <script>
        function copyText(elementId) {{
            const element = document.getElementById(elementId);
            const text = element.textContent;
            const btn = element.nextElementSibling;
            navigator.clipboard.writeText(text).then(() => {{
                btn.textContent = 'Copied';
                btn.classList.add('copied');
                setTimeout(() => {{
                    btn.textContent = 'Copy';
                    btn.classList.remove('copied');
                }}, 2000);
            }}).catch(() => {{
                alert('Copy failed - please copy manually');
            }});
        }}
    </script>
</body>
</html>
"#
    )
}

fn field_group(label: &str, id: &str, value: &str) -> String {
    format!(
        r#"        <div class="info-group">
            <span class="label">{label}</span>
            <span class="value" id="{id}">{value}</span>
            <button class="copy-btn" onclick="copyText('{id}')">Copy</button>
        </div>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
