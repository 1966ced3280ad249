//! Plain-text rendering for habits and the contribution graph.

use habitgrid_core::{group_into_weeks, DayBucket, Habit};

/// Intensity glyphs indexed by band level.
const BAND_GLYPHS: [char; 6] = ['.', '░', '▒', '▓', '█', '#'];

pub fn habit_line(habit: &Habit) -> String {
    let mut line = format!("{}  {}", habit.id, habit.name);
    if let Some(icon) = habit.icon.as_deref() {
        line.push_str(&format!("  icon={icon}"));
    }
    if let Some(color) = habit.color.as_deref() {
        line.push_str(&format!("  color={color}"));
    }
    line
}

/// Renders weeks as columns, one row per weekday slot, oldest week first.
pub fn graph(buckets: &[DayBucket]) -> String {
    let weeks = group_into_weeks(buckets);
    let mut out = String::new();
    for row in 0..7 {
        for week in &weeks {
            let glyph = week
                .get(row)
                .map(|bucket| BAND_GLYPHS[usize::from(bucket.band().level())])
                .unwrap_or(' ');
            out.push(glyph);
            out.push(' ');
        }
        out.push('\n');
    }

    if let (Some(first), Some(last)) = (buckets.first(), buckets.last()) {
        out.push_str(&format!("{} .. {}  less ", first.date, last.date));
        out.extend(BAND_GLYPHS.iter());
        out.push_str(" more\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{graph, habit_line};
    use habitgrid_core::{compute_window, CompletionDate, CompletionsByDate, Habit, HabitId};

    #[test]
    fn habit_line_omits_absent_style() {
        let habit = Habit::with_id(HabitId::parse("h1").unwrap(), "Read", None, Some("blue"))
            .unwrap();
        assert_eq!(habit_line(&habit), "h1  Read  color=blue");
    }

    #[test]
    fn graph_has_seven_rows_and_a_legend() {
        let today = CompletionDate::parse("2024-01-10").unwrap();
        let buckets = compute_window(today, 10, &[], &CompletionsByDate::new());
        let rendered = graph(&buckets);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with(". ."));
        assert!(lines[7].starts_with("2024-01-01 .. 2024-01-10"));
    }
}
