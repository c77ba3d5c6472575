use serde::{Deserialize, Serialize};
use validator_derive::Validate;

pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_PAGE: u64 = 1;

#[derive(Debug, Clone, Copy, Deserialize, Validate, PartialEq, Eq)]
pub struct PageQuery {
  #[serde(default = "default_limit")]
  #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
  pub limit: u64,
  #[serde(default = "default_page")]
  #[validate(range(min = 1, message = "page must be at least 1"))]
  pub page: u64,
}

fn default_limit() -> u64 {
  DEFAULT_LIMIT
}

fn default_page() -> u64 {
  DEFAULT_PAGE
}

impl Default for PageQuery {
  fn default() -> Self {
    Self {
      limit: DEFAULT_LIMIT,
      page: DEFAULT_PAGE,
    }
  }
}

impl PageQuery {
  pub fn offset(&self) -> u64 {
    (self.page.saturating_sub(1)).saturating_mul(self.limit)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub results: Vec<T>,
  pub total: u64,
  pub page: u64,
  pub limit: u64,
  pub page_total: u64,
}

impl<T> Page<T> {
  pub fn new(results: Vec<T>, total: u64, query: &PageQuery) -> Self {
    Self {
      results,
      total,
      page: query.page,
      limit: query.limit,
      page_total: total.div_ceil(query.limit.max(1)),
    }
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      results: self.results.into_iter().map(f).collect(),
      total: self.total,
      page: self.page,
      limit: self.limit,
      page_total: self.page_total,
    }
  }
}
