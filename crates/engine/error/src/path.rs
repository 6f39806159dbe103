use std::fmt;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Default)]
pub struct ErrorPath(Vec<ErrorPathSegment>);

impl ErrorPath {
    pub fn push(&mut self, segment: impl InsertIntoErrorPath) {
        segment.insert_into(self);
    }

    #[must_use]
    pub fn child(&self, segment: impl InsertIntoErrorPath) -> Self {
        let mut path = self.clone();
        segment.insert_into(&mut path);
        path
    }
}

impl std::ops::Deref for ErrorPath {
    type Target = Vec<ErrorPathSegment>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for ErrorPath {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl serde::Serialize for ErrorPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                ErrorPathSegment::Field(name) if i == 0 => f.write_str(name)?,
                ErrorPathSegment::Field(name) => write!(f, ".{name}")?,
                ErrorPathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, serde::Serialize)]
#[serde(untagged)]
pub enum ErrorPathSegment {
    Field(Box<str>),
    Index(usize),
}

pub trait InsertIntoErrorPath {
    fn insert_into(self, path: &mut ErrorPath);
}

impl InsertIntoErrorPath for ErrorPathSegment {
    fn insert_into(self, path: &mut ErrorPath) {
        path.0.push(self);
    }
}

impl InsertIntoErrorPath for &ErrorPathSegment {
    fn insert_into(self, path: &mut ErrorPath) {
        path.0.push(self.clone());
    }
}

impl InsertIntoErrorPath for &str {
    fn insert_into(self, path: &mut ErrorPath) {
        path.0.push(ErrorPathSegment::Field(self.into()));
    }
}

impl InsertIntoErrorPath for String {
    fn insert_into(self, path: &mut ErrorPath) {
        path.0.push(ErrorPathSegment::Field(self.into_boxed_str()));
    }
}

impl InsertIntoErrorPath for usize {
    fn insert_into(self, path: &mut ErrorPath) {
        path.0.push(ErrorPathSegment::Index(self));
    }
}

impl<'a, T> InsertIntoErrorPath for &'a [T]
where
    &'a T: InsertIntoErrorPath,
{
    fn insert_into(self, path: &mut ErrorPath) {
        for item in self {
            item.insert_into(path);
        }
    }
}

impl<'a, T> InsertIntoErrorPath for &'a Vec<T>
where
    &'a T: InsertIntoErrorPath,
{
    fn insert_into(self, path: &mut ErrorPath) {
        self.as_slice().insert_into(path);
    }
}

impl InsertIntoErrorPath for &ErrorPath {
    fn insert_into(self, path: &mut ErrorPath) {
        path.0.extend(self.0.iter().cloned());
    }
}

impl<T1: InsertIntoErrorPath, T2: InsertIntoErrorPath> InsertIntoErrorPath for (T1, T2) {
    fn insert_into(self, path: &mut ErrorPath) {
        self.0.insert_into(path);
        self.1.insert_into(path);
    }
}

impl<T: InsertIntoErrorPath> From<T> for ErrorPath {
    fn from(t: T) -> Self {
        let mut path = ErrorPath(Vec::new());
        t.insert_into(&mut path);
        path
    }
}
