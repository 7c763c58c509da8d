use quick_error::quick_error;
use std::io::Error as IOError;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum VolsurfError {
        /// The coordinate space descriptor has no transform chain.
        UnsupportedSpace(name: String) {
            display("Unsupported coordinate space '{}'", name)
        }

        /// Neither transform chain can be run with the supplied inputs.
        MissingInputs(what: String) {
            display("Missing required inputs: {}", what)
        }

        UnknownHemisphere(name: String) {
            display("Unknown hemisphere '{}', expected 'lh' or 'rh'", name)
        }

        UnknownInterpolation(name: String) {
            display("Unknown interpolation mode '{}', expected 'linear' or 'nearest'", name)
        }

        UnknownOutputFormat(name: String) {
            display("Unknown output format '{}', expected 'gii' or 'curv'", name)
        }

        InvalidNifti(reason: String) {
            display("Invalid NIfTI file: {}", reason)
        }

        InvalidGifti(reason: String) {
            display("Invalid GIFTI file: {}", reason)
        }

        /// Invalid curv file: wrong magic number.
        InvalidCurvFormat {
            display("Invalid Curv file")
        }

        InvalidFsSurfaceFormat {
            display("Invalid FreeSurfer surf file")
        }

        /// A mask or mesh does not line up with the data it is paired with.
        ShapeMismatch(what: String, expected: Vec<usize>, found: Vec<usize>) {
            display("Shape mismatch for {}: expected {:?}, found {:?}", what, expected, found)
        }

        VertexCountMismatch(what: String, expected: usize, found: usize) {
            display("Vertex count mismatch for {}: expected {}, found {}", what, expected, found)
        }

        InvalidMapping(reason: String) {
            display("Invalid registration resource: {}", reason)
        }

        /// Failure inside a registration or resampling collaborator.
        Capability(stage: &'static str, reason: String) {
            display("{} failed: {}", stage, reason)
        }

        /// A transform chain reached a stage without the data that stage consumes.
        InconsistentChain(reason: String) {
            display("Inconsistent transform chain: {}", reason)
        }

        Xml(err: quick_xml::Error) {
            from()
            source(err)
            display("XML error: {}", err)
        }

        Base64(err: base64::DecodeError) {
            from()
            source(err)
            display("Base64 decoding error: {}", err)
        }

        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, VolsurfError>;
