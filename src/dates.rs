//! Fixed-width date layouts used by chat commands and spreadsheets.
//!
//! chrono's `%Y` takes any number of digits and a sign, so the shape is
//! checked byte by byte before chrono validates the calendar date.

use chrono::NaiveDate;

/// `YYYY-MM-DD`, as typed in `/criar` and `/editar`.
pub const ISO: Layout = Layout {
    shape: "0000-00-00",
    format: "%Y-%m-%d",
};

/// `DD/MM/YYYY`, the PontoMais wire format and the usual sheet format.
pub const DAY_FIRST: Layout = Layout {
    shape: "00/00/0000",
    format: "%d/%m/%Y",
};

#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// `0` marks an ASCII digit, anything else must match literally.
    shape: &'static str,
    format: &'static str,
}

impl Layout {
    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        if !self.matches_shape(s) {
            return None;
        }
        NaiveDate::parse_from_str(s, self.format).ok()
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.format).to_string()
    }

    fn matches_shape(&self, s: &str) -> bool {
        s.len() == self.shape.len()
            && s.bytes().zip(self.shape.bytes()).all(|(b, want)| match want {
                b'0' => b.is_ascii_digit(),
                lit => b == lit,
            })
    }
}
