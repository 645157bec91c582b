use std::collections::VecDeque;

use serde::Serialize;

pub trait Id {
    fn id(&self) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub cursor: Option<i64>,
    pub page_size: i64,
    pub desc: bool,
}

/// cursors for the neighbouring pages, `None` when there is no such page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub prev: Option<i64>,
    pub next: Option<i64>,
    pub total: Option<i64>,
}

pub trait Paginator: Sized {
    fn get_pager<T: Id>(&self, data: &mut VecDeque<T>) -> Pager;
    fn next_page(&self, pager: &Pager) -> Option<Self>;
}

impl Paginator for PageInfo {
    /// `data` holds up to `page_size + 1` rows fetched after the cursor; the extra row only
    /// tells whether another page exists and is dropped here
    fn get_pager<T: Id>(&self, data: &mut VecDeque<T>) -> Pager {
        let has_next = data.len() as i64 > self.page_size;
        if has_next {
            data.pop_back();
        }

        let prev = match self.cursor {
            Some(_) => data.front().map(|v| v.id()),
            None => None,
        };
        let next = if has_next {
            data.back().map(|v| v.id())
        } else {
            None
        };

        Pager {
            prev,
            next,
            total: None,
        }
    }

    fn next_page(&self, pager: &Pager) -> Option<Self> {
        pager.next.map(|cursor| Self {
            cursor: Some(cursor),
            page_size: self.page_size,
            desc: self.desc,
        })
    }
}
