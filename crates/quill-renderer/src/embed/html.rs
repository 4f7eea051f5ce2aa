//! HTML output for embed tokens.

use super::Embed;
use crate::escape_html;

const VIDEO_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

const TWITTER_WIDGETS: &str =
    r#"<script async src="https://platform.twitter.com/widgets.js" charset="utf-8"></script>"#;

pub(super) fn codesandbox(embed: &Embed) -> String {
    let mut url = format!("https://codesandbox.io/p/sandbox/{}", embed.id);
    if let Some(path) = &embed.path {
        url.push_str("?file=");
        url.push_str(path);
    }
    sandbox(&url, embed)
}

pub(super) fn typescript_sandbox(embed: &Embed) -> String {
    sandbox(
        &format!("https://www.typescriptlang.org/play/?#code/{}", embed.id),
        embed,
    )
}

pub(super) fn youtube(embed: &Embed) -> String {
    video(
        "youtube",
        &format!("https://www.youtube.com/embed/{}", embed.id),
        embed,
    )
}

pub(super) fn vimeo(embed: &Embed) -> String {
    video(
        "vimeo",
        &format!("https://player.vimeo.com/video/{}", embed.id),
        embed,
    )
}

pub(super) fn twitter(embed: &Embed) -> String {
    format!(
        r#"<section class="twitter"><blockquote class="twitter-tweet"><a href="https://twitter.com/x/status/{}"></a></blockquote> {TWITTER_WIDGETS}</section>"#,
        escape_html(&embed.id)
    )
}

fn sandbox(url: &str, embed: &Embed) -> String {
    format!(
        r#"<section class="sandbox"><iframe src="{}"{}></iframe></section>"#,
        escape_html(url),
        sizing(embed)
    )
}

fn video(class: &str, url: &str, embed: &Embed) -> String {
    let mut attrs = sizing(embed);
    if let Some(width) = &embed.width {
        attrs.push_str(&format!(r#" width="{}""#, escape_html(width)));
    }
    if let Some(height) = &embed.height {
        attrs.push_str(&format!(r#" height="{}""#, escape_html(height)));
    }
    format!(
        r#"<section class="{class}"><iframe src="{}"{attrs} frameborder="0" allow="{VIDEO_ALLOW}" allowfullscreen></iframe></section>"#,
        escape_html(url)
    )
}

/// Inline `style` attribute, only when both dimensions are known.
fn sizing(embed: &Embed) -> String {
    match (&embed.width, &embed.height) {
        (Some(width), Some(height)) => format!(
            r#" style="width: {}px; height: {}px; border: 0;""#,
            escape_html(width),
            escape_html(height)
        ),
        _ => String::new(),
    }
}
