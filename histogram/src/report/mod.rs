// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Error, Histogram};

use std::io::Write;

impl Histogram {
    /// Write the percentile distribution as a fixed column table, followed
    /// by a summary footer. The column layout matches the textual output of
    /// the other HDR histogram implementations so reports diff cleanly
    /// across languages.
    pub fn write_percentile_distribution<W: Write>(
        &self,
        writer: &mut W,
        ticks_per_half_distance: u32,
    ) -> Result<(), Error> {
        let sig = usize::from(self.sigfig());

        writeln!(
            writer,
            "{:>12} {:>14} {:>10} {:>14}\n",
            "Value", "Percentile", "TotalCount", "1/(1-Percentile)"
        )?;

        for v in self.iter_percentiles(ticks_per_half_distance) {
            let value = v.value_iterated_to() as f64;
            let fraction = v.percentile_iterated_to() / 100.0;
            if v.percentile_iterated_to() < 100.0 {
                writeln!(
                    writer,
                    "{:>12.sig$} {:>2.12} {:>10} {:>14.2}",
                    value,
                    fraction,
                    v.total_count_to_this_value(),
                    1.0 / (1.0 - fraction),
                )?;
            } else {
                // the final line reports infinity by omission
                writeln!(
                    writer,
                    "{:>12.sig$} {:>2.12} {:>10}",
                    value,
                    fraction,
                    v.total_count_to_this_value(),
                )?;
            }
        }

        writeln!(
            writer,
            "#[Mean    = {:>12.sig$}, StdDeviation   = {:>12.sig$}]",
            self.mean(),
            self.stdev(),
        )?;
        writeln!(
            writer,
            "#[Min     = {:>12.sig$}, Max            = {:>12.sig$}]",
            self.min() as f64,
            self.max() as f64,
        )?;
        writeln!(writer, "#[Total count    = {:>12}]", self.count())?;
        writeln!(
            writer,
            "#[Buckets = {:>12}, SubBuckets     = {:>12}]",
            self.buckets(),
            self.sub_buckets(),
        )?;
        Ok(())
    }
}
