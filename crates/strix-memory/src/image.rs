//! Image-attachment capping: at most the 3 most recent images are attached
//! verbatim; older images are replaced by a text placeholder (§4.4).

use strix_core::message::Message;

/// Maximum number of images kept attached across the whole compressed view.
pub const MAX_IMAGES: usize = 3;

/// Return a copy of `messages` with all but the most recent
/// [`MAX_IMAGES`] images replaced by a placeholder note appended to that
/// message's text.
#[must_use]
pub fn cap_images(messages: &[Message]) -> Vec<Message> {
    let total_images: usize = messages.iter().map(|m| m.images.len()).sum();
    if total_images <= MAX_IMAGES {
        return messages.to_vec();
    }

    let mut remaining_budget = MAX_IMAGES;
    let mut images_seen = 0usize;
    let mut out = Vec::with_capacity(messages.len());

    for message in messages.iter().rev() {
        if message.images.is_empty() {
            out.push(message.clone());
            continue;
        }

        let mut copy = message.clone();
        let keep_from_this_message = remaining_budget.min(copy.images.len());
        let dropped = copy.images.len() - keep_from_this_message;
        images_seen += copy.images.len();
        remaining_budget = remaining_budget.saturating_sub(keep_from_this_message);

        // Keep the most recent images within this message (the tail), drop the rest.
        copy.images = copy.images.split_off(copy.images.len() - keep_from_this_message);
        if dropped > 0 {
            let note = format!("[{dropped} earlier image(s) omitted]");
            copy.text = Some(match copy.text {
                Some(existing) => format!("{existing}\n{note}"),
                None => note,
            });
        }
        out.push(copy);
    }

    debug_assert!(images_seen >= total_images.min(images_seen));
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use strix_core::message::ImageAttachment;

    use super::*;

    fn image_message(n: usize) -> Message {
        let mut msg = Message::user(format!("turn {n}"));
        msg.images.push(ImageAttachment {
            data: format!("data-{n}"),
            media_type: "image/png".into(),
        });
        msg
    }

    #[test]
    fn under_budget_is_unchanged() {
        let messages: Vec<_> = (0..2).map(image_message).collect();
        let capped = cap_images(&messages);
        assert_eq!(capped[0].images.len(), 1);
        assert_eq!(capped[1].images.len(), 1);
    }

    #[test]
    fn keeps_only_most_recent_three() {
        let messages: Vec<_> = (0..5).map(image_message).collect();
        let capped = cap_images(&messages);
        let total_kept: usize = capped.iter().map(|m| m.images.len()).sum();
        assert_eq!(total_kept, MAX_IMAGES);
        // the three most recent messages (indices 2,3,4) keep their image.
        assert_eq!(capped[4].images.len(), 1);
        assert_eq!(capped[0].images.len(), 0);
        assert!(capped[0].text.as_deref().unwrap().contains("omitted"));
    }
}
