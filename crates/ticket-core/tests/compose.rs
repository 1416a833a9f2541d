//! End-to-end tests for the compose pipeline, using the built-in face so
//! no font files are required on disk.

use chrono::NaiveDate;
use ticket_core::{
    content::{TicketContent, Urgency},
    due::DueMode,
    fonts::{FontBank, FontSizes},
    layout::{self, LayoutConfig, MIN_HEIGHT},
    raster::Canvas,
};

fn ticket(body: &str) -> TicketContent {
    TicketContent {
        id: "a1b2c3d4e5".to_string(),
        title: "Buy milk".to_string(),
        body: body.to_string(),
        urgency: Urgency::High,
        urgency_plus: true,
        tag: Some("home".to_string()),
        author: Some("Corey".to_string()),
        due: DueMode::ThisWeek,
        created: NaiveDate::from_ymd_opt(2025, 10, 7).unwrap(),
    }
}

fn render(t: &TicketContent) -> Canvas {
    let bank = FontBank::builtin(&FontSizes::default());
    layout::compose(t, &bank, &LayoutConfig::default())
}

/// Look for a row whose ink starts at the left margin and spans exactly
/// the checkbox width (body size 22 -> 17 dots), followed by the gap
/// between box and text.
fn has_checkbox_row(canvas: &Canvas) -> bool {
    let box_s: u32 = 22 * 78 / 100;
    (0..canvas.height()).any(|y| {
        (6..6 + box_s).all(|x| canvas.ink_at(x, y))
            && !canvas.ink_at(6 + box_s, y)
            && !canvas.ink_at(6 + box_s + 1, y)
    })
}

#[test]
fn composing_twice_is_byte_identical() {
    let t = ticket("- milk\n- eggs\n\nremember the coupons");
    let a = render(&t);
    let b = render(&t);
    assert_eq!(a.as_bytes(), b.as_bytes());
    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
}

#[test]
fn checkbox_marker_renders_a_hollow_box() {
    let with_marker = render(&ticket("- buy milk"));
    let without = render(&ticket("buy milk"));
    assert!(has_checkbox_row(&with_marker));
    assert!(!has_checkbox_row(&without));
}

#[test]
fn empty_title_still_renders() {
    let mut t = ticket("");
    t.title = String::new();
    let canvas = render(&t);
    assert_eq!(576, canvas.width());
    assert!(canvas.height() >= MIN_HEIGHT);
    assert!(canvas.ink_count() > 0);
}

#[test]
fn canvas_width_is_constant_and_height_varies() {
    let short = render(&ticket("one line"));
    let long = render(&ticket(&"line\n".repeat(40)));
    assert_eq!(short.width(), long.width());
    assert!(long.height() > short.height());
}

#[test]
fn long_unbroken_token_stays_inside_the_margins() {
    let url: String = std::iter::repeat('x').take(200).collect();
    let canvas = render(&ticket(&url));
    // the right margin column stays clean for every body row
    for y in 0..canvas.height() {
        assert!(!canvas.ink_at(canvas.width() - 1, y));
    }
}

#[test]
fn narrower_head_produces_narrower_canvas() {
    let cfg = LayoutConfig {
        width: 384,
        ..LayoutConfig::default()
    };
    let bank = FontBank::builtin(&FontSizes::default());
    let canvas = layout::compose(&ticket("- milk"), &bank, &cfg);
    assert_eq!(384, canvas.width());
    assert_eq!(48, canvas.bytes_per_line());
}
