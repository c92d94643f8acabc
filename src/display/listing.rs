//! Plain-text review listing.
//!
//! Walks every display page of the session the way a device UI would and
//! writes one line per value page.

use crate::display::session::ReviewSession;
use crate::model::ParserError;

/// Renders the whole review.
///
/// Each page becomes `[i/n] Label: value`; values longer than the page width
/// get one line per value page, tagged `(p/P)`. The last line states whether
/// expert mode is active. With `friendly` unset the raw item keys are shown.
///
/// # Errors
///
/// Any error of the session aborts the listing; a partial review is never
/// returned.
pub fn render_review(session: &mut ReviewSession, friendly: bool) -> Result<String, ParserError> {
    let num_items = session.num_items()?;
    let mut out = String::new();

    for index in 0..num_items {
        let item = session.query(index)?;
        let label = if friendly {
            session.make_friendly()?.to_string()
        } else {
            item.key.to_string()
        };

        let (first, page_count) = session.render_value(item.value, 0)?;
        push_line(&mut out, index, num_items, &label, (0, page_count), &first);
        for page in 1..page_count {
            let (text, _) = session.render_value(item.value, page)?;
            push_line(&mut out, index, num_items, &label, (page, page_count), &text);
        }
    }

    let expert = session.is_expert_mode()?;
    out.push_str(&format!(
        "Expert mode: {}\n",
        if expert { "on" } else { "off" }
    ));
    Ok(out)
}

fn push_line(
    out: &mut String,
    index: usize,
    num_items: usize,
    label: &str,
    (page, page_count): (usize, usize),
    text: &str,
) {
    let position = format!("[{}/{}]", index + 1, num_items);
    if page_count > 1 {
        out.push_str(&format!(
            "{position} {label} ({}/{page_count}): {text}\n",
            page + 1
        ));
    } else {
        out.push_str(&format!("{position} {label}: {text}\n"));
    }
}
