/// Exchange properties of amino acid residues
pub mod amino_acid;
/// Masses of charged species, e.g. protons
pub mod molecule;
