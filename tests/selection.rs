//! End-to-end: source file → candidates → debounced re-selection → surface.
//!
//! Run with: cargo test --test selection

use picture_bg::debounce::DebouncedTrigger;
use picture_bg::surface::{RecordingSurface, SurfaceWrite};
use picture_bg::types::SourceAttrs;
use picture_bg::viewport::Viewport;
use picture_bg::{CandidateList, Selector, select, source};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

const HERO_TOML: &str = r#"
[[source]]
media = "(min-width: 0px)"
type = "image/jpeg"
srcset = "hero-480.jpg 480w, hero-960.jpg 960w"

[[source]]
media = "(min-width: 768px)"
type = "image/jpeg"
srcset = "hero-1280.jpg"

[[source]]
media = "(min-width: 1440px)"
type = "image/avif"
data-srcset = "hero-2560.avif 1x, hero-5120.avif 2x"
"#;

fn hero_candidates() -> CandidateList {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("hero.toml");
    std::fs::write(&path, HERO_TOML).unwrap();
    let file = source::load_sources(&path).unwrap();
    CandidateList::try_from_sources(&file.sources).unwrap()
}

#[test]
fn source_file_selection_across_viewports() {
    let list = hero_candidates();
    let cases = [
        (320, Some("hero-480.jpg")),
        (768, Some("hero-1280.jpg")),
        (1439, Some("hero-1280.jpg")),
        (1440, Some("hero-2560.avif")),
        (3840, Some("hero-2560.avif")),
    ];
    for (width, expected) in cases {
        let sel = select(&list, &Viewport::new(width, 900));
        assert_eq!(sel.image_ref(&list), expected, "width {width}");
    }
}

#[test]
fn desktop_first_sources_without_base_show_nothing_on_small_screens() {
    let list = CandidateList::from_sources(&[
        SourceAttrs::new("(min-width: 768px)", "tablet.jpg"),
        SourceAttrs::new("(min-width: 1200px)", "desktop.jpg"),
    ]);
    let sel = select(&list, &Viewport::new(375, 812));
    assert!(sel.is_none());
    assert_eq!(sel.displayed_flags(), vec![false, false]);
}

#[test]
fn invalid_sources_are_skipped_not_fatal() {
    let list = CandidateList::from_sources(&[
        SourceAttrs {
            srcset: Some("orphan.jpg".into()),
            ..SourceAttrs::default()
        },
        SourceAttrs::new("(min-width: 0px)", "base.jpg"),
    ]);
    assert_eq!(list.len(), 1);
    let sel = select(&list, &Viewport::new(1024, 768));
    assert_eq!(sel.image_ref(&list), Some("base.jpg"));
}

#[test]
fn resize_burst_reselects_once_with_last_viewport() {
    let mut selector = Selector::new(hero_candidates());
    let mut surface = RecordingSurface::new();

    // Initial load on a phone
    selector.refresh(&Viewport::new(375, 812), &mut surface);
    assert_eq!(surface.visible_layer(), Some(0));
    surface.take_writes();

    let shared = Arc::new(Mutex::new((selector, surface, 0usize)));
    let worker_state = Arc::clone(&shared);
    let (done, fired) = mpsc::channel();
    let trigger = DebouncedTrigger::spawn(Duration::from_secs(1), move |vp: Viewport| {
        let mut guard = worker_state.lock().unwrap();
        let (selector, surface, passes) = &mut *guard;
        selector.refresh(&vp, surface);
        *passes += 1;
        let _ = done.send(vp.width);
    });

    // Dragging the window wider
    for width in [500, 800, 1100, 1600, 1920] {
        trigger.signal(Viewport::new(width, 1080));
    }
    assert_eq!(fired.recv_timeout(Duration::from_secs(10)), Ok(1920));
    trigger.shutdown();
    assert_eq!(fired.try_iter().count(), 0);

    let guard = shared.lock().unwrap();
    let (_, surface, passes) = &*guard;
    assert_eq!(*passes, 1);
    assert_eq!(surface.visible_layer(), Some(2));
    assert_eq!(
        surface.layer(2).unwrap().image.as_deref(),
        Some(r#"url("hero-2560.avif")"#)
    );
    // Layer 1 was never shown during the burst
    assert_eq!(surface.layer(1).unwrap().image, None);
    assert!(surface.writes().contains(&SurfaceWrite::Displayed {
        index: 0,
        displayed: false
    }));
}
