//! Built-in course catalog. Seeds an empty store and serves as the fallback
//! dataset whenever the store is absent or failing.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Course, CourseLevel};

struct SampleCourse {
    id: &'static str,
    title: &'static str,
    short_description: &'static str,
    full_description: &'static str,
    duration: &'static str,
    instructor: &'static str,
    prerequisites: &'static [&'static str],
    category: &'static str,
    level: CourseLevel,
    image_url: &'static str,
    tags: &'static [&'static str],
    created: (i32, u32, u32),
    updated: (i32, u32, u32),
}

const SAMPLE_COURSES: &[SampleCourse] = &[
    SampleCourse {
        id: "1",
        title: "Introduction to Data Analytics",
        short_description: "Learn the fundamentals of data analysis and visualization techniques.",
        full_description: "This comprehensive course covers the essential concepts of data analytics, including data collection, cleaning, analysis, and visualization. You will learn to use popular tools and techniques to extract meaningful insights from data. The course includes hands-on projects with real-world datasets and covers statistical analysis, data mining, and business intelligence concepts.",
        duration: "6 weeks",
        instructor: "Dr. Sarah Johnson",
        prerequisites: &["Basic mathematics", "Computer literacy"],
        category: "Data Science",
        level: CourseLevel::Beginner,
        image_url: "/images/data-analytics.jpg",
        tags: &["analytics", "data", "visualization", "statistics"],
        created: (2024, 1, 15),
        updated: (2024, 1, 15),
    },
    SampleCourse {
        id: "2",
        title: "Advanced JavaScript Development",
        short_description: "Master modern JavaScript concepts and advanced programming techniques.",
        full_description: "Dive deep into advanced JavaScript concepts including ES6+ features, asynchronous programming, closures, prototypes, and design patterns. This course covers modern development practices, testing methodologies, and performance optimization. You will build complex applications and learn to write clean, maintainable code following industry best practices.",
        duration: "8 weeks",
        instructor: "Michael Chen",
        prerequisites: &["Basic JavaScript knowledge", "HTML/CSS fundamentals"],
        category: "Programming",
        level: CourseLevel::Advanced,
        image_url: "/images/javascript.jpg",
        tags: &["javascript", "programming", "web development", "es6"],
        created: (2024, 1, 10),
        updated: (2024, 1, 20),
    },
    SampleCourse {
        id: "3",
        title: "Digital Marketing Fundamentals",
        short_description: "Comprehensive guide to digital marketing strategies and tools.",
        full_description: "Learn the core principles of digital marketing including SEO, social media marketing, content marketing, email campaigns, and paid advertising. This course provides practical knowledge on how to create effective marketing campaigns, measure ROI, and use analytics tools to optimize performance. Includes case studies from successful marketing campaigns.",
        duration: "4 weeks",
        instructor: "Emma Rodriguez",
        prerequisites: &["Basic computer skills"],
        category: "Marketing",
        level: CourseLevel::Beginner,
        image_url: "/images/digital-marketing.jpg",
        tags: &["marketing", "seo", "social media", "advertising"],
        created: (2024, 1, 5),
        updated: (2024, 1, 25),
    },
    SampleCourse {
        id: "4",
        title: "Project Management Professional",
        short_description: "Learn professional project management methodologies and best practices.",
        full_description: "This course covers comprehensive project management principles including project planning, execution, monitoring, and closure. You will learn popular methodologies like Agile, Scrum, and Waterfall. The course includes risk management, stakeholder communication, budget management, and quality assurance. Prepare for PMP certification with practical exercises and real-world scenarios.",
        duration: "10 weeks",
        instructor: "Robert Kim",
        prerequisites: &["Work experience in project environments"],
        category: "Management",
        level: CourseLevel::Intermediate,
        image_url: "/images/project-management.jpg",
        tags: &["project management", "agile", "scrum", "leadership"],
        created: (2024, 1, 12),
        updated: (2024, 1, 18),
    },
    SampleCourse {
        id: "5",
        title: "Cybersecurity Essentials",
        short_description: "Essential cybersecurity concepts and practices for modern organizations.",
        full_description: "Understand the fundamentals of cybersecurity including threat assessment, risk management, network security, and incident response. This course covers common attack vectors, security frameworks, compliance requirements, and best practices for protecting organizational assets. Learn to implement security measures and develop security policies.",
        duration: "7 weeks",
        instructor: "Dr. Lisa Wang",
        prerequisites: &["Basic networking knowledge", "IT fundamentals"],
        category: "Security",
        level: CourseLevel::Intermediate,
        image_url: "/images/cybersecurity.jpg",
        tags: &["security", "cybersecurity", "networking", "compliance"],
        created: (2024, 1, 8),
        updated: (2024, 1, 22),
    },
    SampleCourse {
        id: "6",
        title: "Cloud Computing with AWS",
        short_description: "Master Amazon Web Services and cloud computing fundamentals.",
        full_description: "Comprehensive introduction to cloud computing using Amazon Web Services. Learn about EC2, S3, RDS, Lambda, and other core AWS services. The course covers cloud architecture, security, cost optimization, and deployment strategies. Includes hands-on labs and prepares you for AWS certification exams.",
        duration: "9 weeks",
        instructor: "David Thompson",
        prerequisites: &["Basic IT knowledge", "Linux fundamentals"],
        category: "Cloud Computing",
        level: CourseLevel::Intermediate,
        image_url: "/images/aws-cloud.jpg",
        tags: &["aws", "cloud", "infrastructure", "devops"],
        created: (2024, 1, 20),
        updated: (2024, 1, 20),
    },
];

pub fn sample_courses() -> Vec<Course> {
    SAMPLE_COURSES.iter().map(SampleCourse::to_course).collect()
}

impl SampleCourse {
    fn to_course(&self) -> Course {
        Course {
            id: self.id.to_string(),
            title: self.title.to_string(),
            short_description: self.short_description.to_string(),
            full_description: self.full_description.to_string(),
            duration: self.duration.to_string(),
            instructor: self.instructor.to_string(),
            prerequisites: self.prerequisites.iter().map(|p| p.to_string()).collect(),
            category: self.category.to_string(),
            level: self.level,
            image_url: self.image_url.to_string(),
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            created_at: midnight_utc(self.created),
            updated_at: midnight_utc(self.updated),
        }
    }
}

fn midnight_utc((year, month, day): (i32, u32, u32)) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}
