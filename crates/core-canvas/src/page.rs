#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub paper_width_mm: f64,
    pub paper_height_mm: f64,
    pub margin_top_mm: f64,
    pub margin_right_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    pub orientation: Orientation,
    pub fit_to_frame: bool,
}

impl PageOptions {
    /// A4 portrait, 10 mm margins on all sides, fit-to-frame on.
    pub fn a4_default() -> Self {
        Self {
            paper_width_mm: 210.0,
            paper_height_mm: 297.0,
            margin_top_mm: 10.0,
            margin_right_mm: 10.0,
            margin_bottom_mm: 10.0,
            margin_left_mm: 10.0,
            orientation: Orientation::Portrait,
            fit_to_frame: true,
        }
    }

    /// Paper dimensions with orientation applied: landscape swaps width
    /// and height roles for the printable frame.
    pub fn oriented_paper_size(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Portrait => (self.paper_width_mm, self.paper_height_mm),
            Orientation::Landscape => (self.paper_height_mm, self.paper_width_mm),
        }
    }

    pub fn frame_size(&self) -> (f64, f64) {
        let (w, h) = self.oriented_paper_size();
        (
            w - self.margin_left_mm - self.margin_right_mm,
            h - self.margin_top_mm - self.margin_bottom_mm,
        )
    }

    pub fn margins_valid(&self) -> bool {
        self.margin_top_mm >= 0.0
            && self.margin_right_mm >= 0.0
            && self.margin_bottom_mm >= 0.0
            && self.margin_left_mm >= 0.0
    }
}
