use super::*;

fn clock_format() -> &'static [FormatItem<'static>] {
    static FMT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse(
            "[hour padding:zero]:[minute padding:zero]:[second padding:zero]",
        )
        .expect("valid time format")
    })
}

pub(super) fn fmt_clock(ts: OffsetDateTime, offset: UtcOffset) -> String {
    ts.to_offset(offset)
        .format(clock_format())
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}
