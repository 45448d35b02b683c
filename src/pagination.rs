//! Lays the word list out into fixed-height pages and tracks which page is on screen.
//!
//! Words flow left to right like a wrapping row: a word is never split, and a
//! line breaks when the next word (plus the gap before it) would not fit. Pages
//! hold at most `max_lines` lines. A word wider than the page still gets a line
//! of its own, so every word lands on exactly one page.

use std::ops::Range;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

pub const SLIDE_DURATION: Duration = Duration::from_millis(300);

/// Measures how much horizontal space a word takes
pub trait TextMeasurer {
    fn width(&self, text: &str) -> usize;
}

/// Terminal cell width via unicode-width
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasurer;

impl TextMeasurer for CellMeasurer {
    fn width(&self, text: &str) -> usize {
        text.width()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub width: usize,
    pub max_lines: usize,
    pub gap: usize,
}

impl PageLayout {
    pub fn new(width: usize, max_lines: usize) -> Self {
        Self {
            width,
            max_lines,
            gap: 1,
        }
    }
}

/// A page: a contiguous run of words, split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<Range<usize>>,
}

impl Page {
    pub fn start(&self) -> usize {
        self.lines.first().map_or(0, |l| l.start)
    }

    pub fn end(&self) -> usize {
        self.lines.last().map_or(0, |l| l.end)
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, word_index: usize) -> bool {
        (self.start()..self.end()).contains(&word_index)
    }
}

/// Break words into lines no wider than `layout.width`
pub fn wrap_lines<M: TextMeasurer + ?Sized>(
    words: &[String],
    measurer: &M,
    layout: PageLayout,
) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0;

    for (idx, word) in words.iter().enumerate() {
        let w = measurer.width(word);
        if idx == line_start {
            line_width = w;
            continue;
        }
        if line_width + layout.gap + w <= layout.width {
            line_width += layout.gap + w;
        } else {
            lines.push(line_start..idx);
            line_start = idx;
            line_width = w;
        }
    }
    if line_start < words.len() {
        lines.push(line_start..words.len());
    }
    lines
}

pub fn paginate<M: TextMeasurer + ?Sized>(
    words: &[String],
    measurer: &M,
    layout: PageLayout,
) -> Vec<Page> {
    let per_page = layout.max_lines.max(1);
    wrap_lines(words, measurer, layout)
        .chunks(per_page)
        .map(|lines| Page {
            lines: lines.to_vec(),
        })
        .collect()
}

/// Horizontal slide between pages, eased out over `SLIDE_DURATION`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTween {
    from: f64,
    to: f64,
    started: Instant,
}

impl SlideTween {
    fn progress(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / SLIDE_DURATION.as_secs_f64()).min(1.0)
    }

    /// Page position at `now`, in page units (1.0 = one full page width)
    pub fn offset(&self, now: Instant) -> f64 {
        let t = self.progress(now);
        let eased = 1.0 - (1.0 - t).powi(3);
        self.from + (self.to - self.from) * eased
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pager {
    pages: Vec<Page>,
    current: usize,
    slide: Option<SlideTween>,
}

impl Pager {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.current)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Swap in a fresh layout, keeping the current page if it still exists
    pub fn set_pages(&mut self, pages: Vec<Page>) {
        self.current = self.current.min(pages.len().saturating_sub(1));
        self.pages = pages;
        self.slide = None;
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.slide = None;
    }

    pub fn page_of(&self, word_index: usize) -> Option<usize> {
        self.pages.iter().position(|p| p.contains(word_index))
    }

    pub fn slide_to(&mut self, page: usize, now: Instant) {
        let clamped = page.min(self.pages.len().saturating_sub(1));
        if clamped == self.current && self.slide.is_none() {
            return;
        }
        let from = self.offset(now);
        self.current = clamped;
        self.slide = Some(SlideTween {
            from,
            to: clamped as f64,
            started: now,
        });
    }

    pub fn next(&mut self, now: Instant) {
        self.slide_to(self.current + 1, now);
    }

    pub fn prev(&mut self, now: Instant) {
        self.slide_to(self.current.saturating_sub(1), now);
    }

    /// Keep the active word on screen: advance past the end of the current page,
    /// or follow the cursor back when it leaves the page's start.
    pub fn follow(&mut self, word_index: usize, now: Instant) {
        let Some(page) = self.current_page() else {
            return;
        };
        if word_index >= page.end() && self.current + 1 < self.pages.len() {
            self.slide_to(self.current + 1, now);
        } else if word_index < page.start() {
            if let Some(target) = self.page_of(word_index) {
                self.slide_to(target, now);
            }
        }
    }

    /// Visual position in page units; equals `current` once any slide settles
    pub fn offset(&self, now: Instant) -> f64 {
        match self.slide {
            Some(tween) => tween.offset(now),
            None => self.current as f64,
        }
    }

    pub fn is_sliding(&self, now: Instant) -> bool {
        self.slide.is_some_and(|t| !t.is_done(now))
    }

    /// Drop a finished tween
    pub fn settle(&mut self, now: Instant) {
        if self.slide.is_some_and(|t| t.is_done(now)) {
            self.slide = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn flatten(pages: &[Page]) -> Vec<usize> {
        pages
            .iter()
            .flat_map(|p| p.lines.iter().cloned().flatten())
            .collect()
    }

    #[test]
    fn lines_break_before_overflowing_word() {
        // "aaa bb" is 6 wide; adding " cccc" would make 11 > 10
        let list = words(&["aaa", "bb", "cccc", "d"]);
        let lines = wrap_lines(&list, &CellMeasurer, PageLayout::new(10, 3));
        assert_eq!(lines, vec![0..2, 2..4]);
    }

    #[test]
    fn exact_fit_stays_on_line() {
        let list = words(&["abcd", "efghi"]);
        let lines = wrap_lines(&list, &CellMeasurer, PageLayout::new(10, 3));
        assert_eq!(lines, vec![0..2]);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let list = words(&["a", "extraordinarily", "b"]);
        let lines = wrap_lines(&list, &CellMeasurer, PageLayout::new(5, 3));
        assert_eq!(lines, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn pages_respect_line_budget_and_keep_order() {
        let list: Vec<String> = (0..30).map(|i| format!("w{i:02}")).collect();
        // 3-wide words, width 11 -> 3 words per line; 2 lines per page -> 6 words per page
        let pages = paginate(&list, &CellMeasurer, PageLayout::new(11, 2));
        assert_eq!(pages.len(), 5);
        assert!(pages.iter().all(|p| p.lines.len() <= 2));
        assert_eq!(flatten(&pages), (0..30).collect::<Vec<_>>());
        assert_eq!(pages[1].start(), 6);
        assert_eq!(pages[1].len(), 6);
    }

    #[test]
    fn empty_list_has_no_pages() {
        assert!(paginate(&[], &CellMeasurer, PageLayout::new(40, 3)).is_empty());
    }

    #[test]
    fn zero_line_budget_still_makes_progress() {
        let list = words(&["a", "b"]);
        let pages = paginate(&list, &CellMeasurer, PageLayout::new(1, 0));
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn wide_glyphs_measure_two_cells() {
        assert_eq!(CellMeasurer.width("日本"), 4);
        let list = words(&["日本", "語"]);
        let lines = wrap_lines(&list, &CellMeasurer, PageLayout::new(6, 1));
        assert_eq!(lines, vec![0..1, 1..2]);
    }

    fn pager_with(n_words: usize, per_page: usize) -> Pager {
        let list: Vec<String> = (0..n_words).map(|_| "ab".to_string()).collect();
        // width 2 -> one word per line
        let mut pager = Pager::default();
        pager.set_pages(paginate(&list, &CellMeasurer, PageLayout::new(2, per_page)));
        pager
    }

    #[test]
    fn slide_to_clamps() {
        let now = Instant::now();
        let mut pager = pager_with(9, 3);
        pager.slide_to(10, now);
        assert_eq!(pager.current(), 2);
        pager.prev(now);
        pager.prev(now);
        pager.prev(now);
        assert_eq!(pager.current(), 0);
    }

    #[test]
    fn follow_advances_one_page_at_end_and_stops_at_last() {
        let now = Instant::now();
        let mut pager = pager_with(6, 3);
        pager.follow(2, now);
        assert_eq!(pager.current(), 0);
        pager.follow(3, now);
        assert_eq!(pager.current(), 1);
        pager.follow(6, now);
        assert_eq!(pager.current(), 1);
    }

    #[test]
    fn follow_returns_to_earlier_page() {
        let now = Instant::now();
        let mut pager = pager_with(6, 3);
        pager.slide_to(1, now);
        pager.follow(2, now);
        assert_eq!(pager.current(), 0);
    }

    #[test]
    fn repagination_clamps_current_page() {
        let now = Instant::now();
        let mut pager = pager_with(9, 3);
        pager.slide_to(2, now);
        let list: Vec<String> = (0..9).map(|_| "ab".to_string()).collect();
        pager.set_pages(paginate(&list, &CellMeasurer, PageLayout::new(2, 9)));
        assert_eq!(pager.current(), 0);
        assert_eq!(pager.page_of(8), Some(0));
    }

    #[test]
    fn slide_eases_toward_target() {
        let start = Instant::now();
        let mut pager = pager_with(9, 3);
        pager.slide_to(1, start);
        assert!(pager.is_sliding(start));
        let mid = pager.offset(start + Duration::from_millis(150));
        assert!(mid > 0.5 && mid < 1.0, "ease-out passes halfway early: {mid}");
        let end = start + SLIDE_DURATION;
        assert_eq!(pager.offset(end), 1.0);
        assert!(!pager.is_sliding(end));
        pager.settle(end);
        assert_eq!(pager.offset(end), 1.0);
    }

    #[test]
    fn empty_pager_is_inert() {
        let now = Instant::now();
        let mut pager = Pager::default();
        pager.follow(3, now);
        pager.next(now);
        assert_eq!(pager.current(), 0);
        assert_eq!(pager.page_of(0), None);
    }
}
