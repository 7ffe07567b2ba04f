//! Chromosome loading: decoded feature records become immutable genes.
//!
//! Records arrive grouped by gene. A gene is kept only when it has both a
//! promoter and a coding region; binding sites are measured against the
//! promoter, so sites are resolved when the gene is finalized.
//!
//! The text form holds one record per line:
//!
//! ```text
//! # geneno,gstart: feature,offset,length: details
//! 0,100: prom,-10,5: ACGTA
//! 0,100: gene,+0,4: 0,1,X; 2,2,TF=local,01,GG
//! 0,100: enhb,-30,6: 0,2,TF=any,01,GG; 3,2,N:out0
//! ```

use crate::error::{MorphoError, Result};
use crate::transcript::{parse_candidate, parse_elements, parse_int, parse_product};
use morphohw_data::{BindSite, FeatureKind, FeatureRecord, Gene};
use std::collections::{BTreeMap, HashSet};

/// Parses one text line. Blank lines and `#` comments yield `None`.
pub fn parse_record_line(line: &str) -> std::result::Result<Option<FeatureRecord>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.splitn(3, ':');
    let (Some(head), Some(feature), Some(detail)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err("expected 'gene,locus: feature,offset,length: details'".to_string());
    };

    let mut head = head.split(',');
    let (Some(index), Some(locus), None) = (head.next(), head.next(), head.next()) else {
        return Err(format!("expected 'gene,locus' but found '{}'", line));
    };
    let gene_index = usize::try_from(parse_int(index, "gene index")?)
        .map_err(|_| format!("negative gene index '{}'", index.trim()))?;
    let gene_locus = parse_int(locus, "gene locus")?;

    let mut feature = feature.split(',');
    let (Some(kind), Some(offset), Some(length), None) = (
        feature.next(),
        feature.next(),
        feature.next(),
        feature.next(),
    ) else {
        return Err("expected 'feature,offset,length'".to_string());
    };
    let kind = FeatureKind::from_token(kind)
        .ok_or_else(|| format!("unknown feature kind '{}'", kind.trim()))?;

    Ok(Some(FeatureRecord {
        gene_index,
        gene_locus,
        kind,
        offset: parse_int(offset, "feature offset")?,
        length: parse_int(length, "feature length")?,
        detail: detail.trim().to_string(),
    }))
}

/// Records of the gene currently being assembled, with their line numbers.
#[derive(Default)]
struct GeneDraft {
    index: usize,
    locus: i64,
    promoter: Option<(usize, FeatureRecord)>,
    coding: Option<(usize, FeatureRecord)>,
    enhancers: Vec<(usize, FeatureRecord)>,
    repressors: Vec<(usize, FeatureRecord)>,
}

impl GeneDraft {
    fn new(record: &FeatureRecord) -> Self {
        Self {
            index: record.gene_index,
            locus: record.gene_locus,
            ..Self::default()
        }
    }

    fn add(&mut self, line: usize, record: FeatureRecord) {
        match record.kind {
            FeatureKind::Promoter => self.promoter = Some((line, record)),
            FeatureKind::Coding => self.coding = Some((line, record)),
            FeatureKind::EnhancerSite => self.enhancers.push((line, record)),
            FeatureKind::RepressorSite => self.repressors.push((line, record)),
        }
    }

    fn build(self) -> Result<Option<Gene>> {
        let (Some((_, promoter)), Some((coding_line, coding))) = (self.promoter, self.coding)
        else {
            tracing::warn!(gene = self.index, "Dropping gene without promoter and coding region");
            return Ok(None);
        };

        let promoter_locus = self.locus + promoter.offset;
        let promoter_length = if promoter.detail.is_empty() {
            promoter.length
        } else {
            promoter.detail.chars().count() as i64
        };

        let mut transcript = BTreeMap::new();
        for element in
            parse_elements(&coding.detail).map_err(|e| MorphoError::chromosome(coding_line, e))?
        {
            let product =
                parse_product(element.payload).map_err(|e| MorphoError::chromosome(coding_line, e))?;
            transcript.insert(self.locus + element.offset + element.length, product);
        }

        let locus = self.locus;
        let build_sites = |records: Vec<(usize, FeatureRecord)>,
                           distance: &dyn Fn(i64, i64) -> i64|
         -> Result<Vec<BindSite>> {
            records
                .into_iter()
                .map(|(line, record)| {
                    let site_locus = locus + record.offset;
                    let mut site = BindSite {
                        locus: site_locus,
                        length: record.length,
                        distance: distance(site_locus, record.length),
                        candidates: Vec::new(),
                    };
                    for element in
                        parse_elements(&record.detail).map_err(|e| MorphoError::chromosome(line, e))?
                    {
                        let candidate = parse_candidate(element.payload)
                            .map_err(|e| MorphoError::chromosome(line, e))?;
                        site.insert_candidate(
                            element.payload.to_string(),
                            candidate,
                            site_locus + element.offset,
                        );
                    }
                    Ok(site)
                })
                .collect()
        };

        let enhancers = build_sites(self.enhancers, &|site, len| {
            promoter_locus - (site + len) + 1
        })?;
        let repressors = build_sites(self.repressors, &|site, _| {
            site - (promoter_locus + promoter_length) + 1
        })?;

        Ok(Some(Gene {
            locus,
            coding_length: coding.length,
            end_locus: locus + coding.length,
            promoter_locus,
            promoter_length,
            promoter_sequence: promoter.detail,
            transcript,
            enhancers,
            repressors,
        }))
    }
}

/// Incremental chromosome builder fed one record at a time.
pub struct ChromosomeLoader {
    gene_limit: Option<usize>,
    current: Option<GeneDraft>,
    finished: HashSet<usize>,
    genes: Vec<Gene>,
}

impl ChromosomeLoader {
    #[must_use]
    pub fn new(gene_limit: Option<usize>) -> Self {
        Self {
            gene_limit,
            current: None,
            finished: HashSet::new(),
            genes: Vec::new(),
        }
    }

    /// Adds a record. `line` is reported with any error it causes.
    pub fn push(&mut self, line: usize, record: FeatureRecord) -> Result<()> {
        if self
            .current
            .as_ref()
            .is_some_and(|draft| draft.index != record.gene_index)
        {
            self.finalize()?;
        }
        if self.finished.contains(&record.gene_index) {
            return Err(MorphoError::chromosome(
                line,
                format!(
                    "records for gene {} are not contiguous",
                    record.gene_index
                ),
            ));
        }
        self.current
            .get_or_insert_with(|| GeneDraft::new(&record))
            .add(line, record);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let Some(draft) = self.current.take() else {
            return Ok(());
        };
        self.finished.insert(draft.index);
        let index = draft.index;
        if let Some(gene) = draft.build()? {
            if self.gene_limit.is_some_and(|limit| self.genes.len() >= limit) {
                tracing::debug!(gene = index, "Gene limit reached, discarding gene");
            } else {
                self.genes.push(gene);
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Chromosome> {
        self.finalize()?;
        Ok(Chromosome::from_genes(self.genes))
    }
}

/// The full set of genes shared by every cell of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    genes: Vec<Gene>,
    length: i64,
    first_site: Option<i64>,
}

impl Chromosome {
    #[must_use]
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        let length = genes
            .iter()
            .map(|g| g.locus + g.coding_length - 1)
            .max()
            .unwrap_or(0);
        let first_site = genes.iter().filter_map(Gene::first_site_locus).min();
        tracing::debug!(genes = genes.len(), length, "Chromosome loaded");
        Self {
            genes,
            length,
            first_site,
        }
    }

    /// Loads the line-oriented text form.
    pub fn parse(text: &str, gene_limit: Option<usize>) -> Result<Self> {
        let mut loader = ChromosomeLoader::new(gene_limit);
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            if let Some(record) =
                parse_record_line(line).map_err(|e| MorphoError::chromosome(line_no, e))?
            {
                loader.push(line_no, record)?;
            }
        }
        loader.finish()
    }

    /// Loads already-decoded records; errors report the record's 1-based position.
    pub fn from_records<I>(records: I, gene_limit: Option<usize>) -> Result<Self>
    where
        I: IntoIterator<Item = FeatureRecord>,
    {
        let mut loader = ChromosomeLoader::new(gene_limit);
        for (i, record) in records.into_iter().enumerate() {
            loader.push(i + 1, record)?;
        }
        loader.finish()
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    #[must_use]
    pub fn gene(&self, index: usize) -> Option<&Gene> {
        self.genes.get(index)
    }

    #[must_use]
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Last locus covered by any coding region.
    #[must_use]
    pub fn length(&self) -> i64 {
        self.length
    }

    /// Span from the first binding site to the last coding locus, if any
    /// gene carries a site.
    #[must_use]
    pub fn used_length(&self) -> Option<i64> {
        self.first_site.map(|first| self.length - first + 1)
    }
}
