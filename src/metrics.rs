#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: usize,
    pub command_count: usize,
    pub activation_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_activations: usize,
}

impl DocumentMetrics {
    pub(crate) fn record_page(&mut self, page: PageMetrics) {
        self.total_activations += page.activation_count;
        self.pages.push(page);
    }
}
