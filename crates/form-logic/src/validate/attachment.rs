use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::response::{Answer, AttachmentPayload};
use crate::spec::field::FieldDefinition;

use super::expect_text;

const BYTES_PER_MB: usize = 1024 * 1024;

pub(crate) fn validate_attachment(
    field: &FieldDefinition,
    answer: &Answer,
    payload: Option<&AttachmentPayload>,
) -> Result<(), String> {
    let filename = expect_text(answer)?;
    let payload = payload.ok_or("attachment content is missing")?;
    if payload.filename != filename {
        return Err("attachment name does not match the answer".into());
    }
    if payload.content.is_empty() {
        return Err("attachment is empty".into());
    }

    let limit = field.attachment_max_size_mb as usize * BYTES_PER_MB;
    if payload.content.len() > limit {
        return Err(format!(
            "attachment exceeds the {} MB limit",
            field.attachment_max_size_mb
        ));
    }

    if !field.allowed_extensions.is_empty() {
        let allowed = build_globs(&field.allowed_extensions)?;
        if !allowed.is_match(filename) {
            return Err(format!("file type of {filename} is not allowed"));
        }
    }
    Ok(())
}

fn build_globs(patterns: &[String]) -> Result<GlobSet, String> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|err| format!("invalid file type rule '{pattern}': {err}"))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| format!("invalid file type rules: {err}"))
}
