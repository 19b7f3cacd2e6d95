//! HTML pages.
//!
//! Simple inline templates without a template engine. Every user-supplied
//! value goes through [`html_escape`].

use tally_model::scoreboard::{Scoreboard, Stats};

use crate::store::users::UserRecord;

/// The stylesheet served at `/css/style.css`.
pub const STYLESHEET: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    max-width: 720px;
    margin: 40px auto;
    padding: 0 20px;
    background: #f5f5f5;
}
.container {
    background: white;
    padding: 30px;
    border-radius: 8px;
    box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}
h1 {
    color: #333;
    border-bottom: 2px solid #0066cc;
    padding-bottom: 10px;
}
nav a {
    margin-right: 12px;
    color: #0066cc;
}
.form-group {
    margin: 15px 0;
}
label {
    display: block;
    font-weight: bold;
    margin-bottom: 5px;
}
input[type="text"],
input[type="password"] {
    width: 100%;
    padding: 10px;
    border: 1px solid #ddd;
    border-radius: 4px;
    box-sizing: border-box;
}
button {
    background: #0066cc;
    color: white;
    padding: 10px 20px;
    border: none;
    border-radius: 4px;
    cursor: pointer;
    font-weight: bold;
}
table {
    width: 100%;
    border-collapse: collapse;
    margin: 20px 0;
}
th, td {
    text-align: left;
    padding: 10px;
    border-bottom: 1px solid #ddd;
}
.error {
    color: #d9534f;
    background: #f2dede;
    padding: 10px;
    border-radius: 4px;
}
.hidden-vote {
    color: #999;
}
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Tally - {title}</title>
    <link rel="stylesheet" href="/css/style.css">
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#
    )
}

fn nav(user: &UserRecord) -> String {
    format!(
        r#"        <nav>
            <a href="/scoreboard">Scoreboard</a>
            <a href="/vote">Vote</a>
            <a href="/logout">Logout {}</a>
        </nav>"#,
        html_escape(&user.username)
    )
}

/// Renders the login page.
pub fn login_page(error: Option<&str>, username: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    });
    let username = html_escape(username.unwrap_or_default());

    page(
        "Login",
        &format!(
            r#"        <h1>Login</h1>
        {error_html}
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" value="{username}" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password">
            </div>
            <div class="form-group">
                <label><input type="checkbox" name="is_master" value="1"> Master</label>
            </div>
            <button type="submit">Login</button>
        </form>"#
        ),
    )
}

/// Renders the voting form.
pub fn vote_page(user: &UserRecord) -> String {
    let current = user.vote.as_deref().map(html_escape).unwrap_or_default();

    page(
        "Vote",
        &format!(
            r#"{nav}
        <h1>Vote</h1>
        <form method="POST" action="/vote">
            <div class="form-group">
                <label for="vote">Your vote:</label>
                <input type="text" id="vote" name="vote" value="{current}" autofocus>
            </div>
            <button type="submit">Vote</button>
        </form>"#,
            nav = nav(user),
        ),
    )
}

/// Renders the scoreboard.
///
/// Votes and stats are only shown once the scoreboard is revealed; until then
/// each row only tells whether the user voted.
pub fn scoreboard_page(user: &UserRecord, board: &Scoreboard) -> String {
    let rows: String = board
        .users
        .iter()
        .map(|ballot| {
            let vote = match (&ballot.vote, ballot.voted) {
                (Some(vote), _) if board.show => html_escape(vote),
                (_, true) => r#"<span class="hidden-vote">voted</span>"#.to_owned(),
                (_, false) => r#"<span class="hidden-vote">-</span>"#.to_owned(),
            };
            let master = if ballot.is_master { " (master)" } else { "" };

            format!(
                r#"
            <tr>
                <td>{}{}</td>
                <td>{}</td>
            </tr>"#,
                html_escape(&ballot.username),
                master,
                vote,
            )
        })
        .collect();

    let stats_html = match (&board.stats, board.show) {
        (Some(stats), true) => stats_table(stats),
        (None, true) => "<p>No votes to aggregate.</p>".to_owned(),
        (_, false) => "<p>Votes are hidden until everyone has voted.</p>".to_owned(),
    };

    let master_html = if user.is_master {
        r#"
        <form method="POST" action="/scoreboard">
            <button type="submit" name="show" value="1">Show</button>
            <button type="submit" name="reset" value="1">Reset</button>
        </form>"#
    } else {
        ""
    };

    page(
        "Scoreboard",
        &format!(
            r#"{nav}
        <h1>Scoreboard</h1>
        <table>
            <tr>
                <th>User</th>
                <th>Vote</th>
            </tr>{rows}
        </table>
        {stats_html}
        <form method="POST" action="/scoreboard">
            <button type="submit" name="refresh" value="1">Refresh</button>
        </form>{master_html}"#,
            nav = nav(user),
        ),
    )
}

fn stats_table(stats: &Stats) -> String {
    format!(
        r#"<table>
            <tr><th>Min</th><td>{}</td></tr>
            <tr><th>Max</th><td>{}</td></tr>
            <tr><th>Average</th><td>{:.2}</td></tr>
        </table>"#,
        stats.min, stats.max, stats.avg
    )
}

/// HTML escape helper.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b onclick="x">'&'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn login_page_shows_errors_escaped() {
        let html = login_page(Some("Wrong <password>!"), Some("alice"));

        assert!(html.contains("Wrong &lt;password&gt;!"));
        assert!(html.contains(r#"value="alice""#));
    }
}
