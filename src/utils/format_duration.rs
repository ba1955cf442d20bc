pub trait FormatDuration {
    fn format_largest(&self) -> String;
}

impl FormatDuration for chrono::Duration {
    #[rustfmt::skip]
    fn format_largest(&self) -> String {
        let (d, h, m, s) = (
            self.num_days(),
            self.num_hours(),
            self.num_minutes(),
            self.num_seconds(),
        );

        match (d, h, m, s) {
            (1  , _  , _  , _  ) => ("1 day").to_string(),
            (2.., _  , _  , _  ) => format!("{d} days"),
            (_  , 1  , _  , _  ) => ("1 hour").to_string(),
            (_  , 2.., _  , _  ) => format!("{h} hours"),
            (_  , _  , 1  , _  ) => ("1 minute").to_string(),
            (_  , _  , 2.., _  ) => format!("{m} minutes"),
            (_  , _  , _  , 1  ) => ("1 second").to_string(),
            (_  , _  , _  , 2..) => format!("{s} seconds"),
            (_  , _  , _  , _  ) => "less than a second".to_string(),
        }
    }
}
